//! One-shot status messages shown on the next rendered page.
//!
//! A notice travels between requests in a signed cookie. Handlers that redirect
//! attach it with [`push_notice`]; the page that renders next consumes it with
//! [`take_notice`], which also clears the cookie so the message shows only once.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use std::fmt;
use std::str::FromStr;

/// Name of the cookie that carries a pending notice.
pub const NOTICE_COOKIE: &str = "notice";

/// Visual category of a notice, used as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Danger,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Danger => "danger",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    TodoAdded,
    TodoUpdated,
    TodoDeleted,
    MissingFields,
    FieldTooLong,
    DuplicateTitle,
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Notice::TodoAdded | Notice::TodoUpdated | Notice::TodoDeleted => NoticeKind::Success,
            Notice::MissingFields | Notice::FieldTooLong | Notice::DuplicateTitle => {
                NoticeKind::Danger
            }
        }
    }

    /// The user-facing text of the notice.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::TodoAdded => "Todo added successfully!",
            Notice::TodoUpdated => "Todo updated successfully!",
            Notice::TodoDeleted => "Todo deleted successfully!",
            Notice::MissingFields => "Please fill in both the title and description.",
            Notice::FieldTooLong => {
                "Title must be at most 200 characters and description at most 500 characters."
            }
            Notice::DuplicateTitle => {
                "A Todo with that title already exists. Please choose a different title."
            }
        }
    }

    /// Stable identifier stored in the notice cookie.
    pub fn as_str(&self) -> &'static str {
        match self {
            Notice::TodoAdded => "todo-added",
            Notice::TodoUpdated => "todo-updated",
            Notice::TodoDeleted => "todo-deleted",
            Notice::MissingFields => "missing-fields",
            Notice::FieldTooLong => "field-too-long",
            Notice::DuplicateTitle => "duplicate-title",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown notice '{0}'")]
pub struct UnknownNotice(String);

impl FromStr for Notice {
    type Err = UnknownNotice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo-added" => Ok(Notice::TodoAdded),
            "todo-updated" => Ok(Notice::TodoUpdated),
            "todo-deleted" => Ok(Notice::TodoDeleted),
            "missing-fields" => Ok(Notice::MissingFields),
            "field-too-long" => Ok(Notice::FieldTooLong),
            "duplicate-title" => Ok(Notice::DuplicateTitle),
            other => Err(UnknownNotice(other.to_string())),
        }
    }
}

/// Queues a notice for the next rendered page.
pub fn push_notice(jar: SignedCookieJar, notice: Notice) -> SignedCookieJar {
    let cookie = Cookie::build((NOTICE_COOKIE, notice.as_str()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    jar.add(cookie)
}

/// Removes the pending notice from the jar and returns it.
///
/// Cookies that fail signature verification are ignored.
pub fn take_notice(jar: SignedCookieJar) -> (SignedCookieJar, Option<Notice>) {
    let Some(cookie) = jar.get(NOTICE_COOKIE) else {
        return (jar, None);
    };

    let notice = match cookie.value().parse::<Notice>() {
        Ok(notice) => Some(notice),
        Err(err) => {
            tracing::warn!("Discarding notice cookie: {}", err);
            None
        }
    };
    let jar = jar.remove(Cookie::build(NOTICE_COOKIE).path("/"));
    (jar, notice)
}
