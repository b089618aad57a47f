//! Recognition of warning notices.

use regex_lite::Regex;

use super::WarningNotice;
use crate::config::WarningsConfig;

/// Extracts the warned user from a moderation bot notice.
pub struct NoticeParser {
    author_marker: String,
    user_field: String,
    mention: Regex,
}

impl NoticeParser {
    pub fn new(author_marker: impl Into<String>, user_field: impl Into<String>) -> Self {
        Self {
            author_marker: author_marker.into(),
            user_field: user_field.into(),
            mention: Regex::new(r"<@!?(\d+)>").expect("mention pattern is valid"),
        }
    }

    pub fn from_config(config: &WarningsConfig) -> Self {
        Self::new(&config.author_marker, &config.user_field)
    }

    /// True if the notice's author name carries the warning marker.
    pub fn is_warning(&self, notice: &WarningNotice) -> bool {
        notice
            .author_name
            .as_deref()
            .is_some_and(|name| name.contains(&self.author_marker))
    }

    /// User id mentioned in the user field of a warning notice.
    ///
    /// Returns `None` for notices that are not warnings or that carry no
    /// parseable mention.
    pub fn warned_user(&self, notice: &WarningNotice) -> Option<String> {
        if !self.is_warning(notice) {
            return None;
        }

        notice
            .fields
            .iter()
            .filter(|field| field.name == self.user_field)
            .find_map(|field| self.mention.captures(&field.value))
            .map(|caps| caps[1].to_string())
    }
}
