#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = todo_list::config::Config::from_env()?;
    todo_list::web::start_web_server(config).await
}
