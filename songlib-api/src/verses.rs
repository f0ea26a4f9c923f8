//! Verse pagination for song lyrics
//!
//! Lyrics are split on `\n`; each page holds a fixed number of verses.
//! Unlike row pagination, a page past the end is an error rather than being
//! clamped to the last page.

use std::ops::Range;
use thiserror::Error;

/// Verses returned per page
pub const VERSES_PER_PAGE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerseError {
    /// Pages are 1-indexed
    #[error("Invalid page parameter: pages start at 1")]
    InvalidPage,

    #[error("Page {page} exceeds total verses ({total_verses})")]
    PageOutOfRange { page: usize, total_verses: usize },
}

/// One page of verses borrowed from the song text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersePage<'a> {
    pub page: usize,
    pub total_verses: usize,
    pub verses: Vec<&'a str>,
}

/// Split lyrics into verses. Empty text is a single empty verse.
pub fn split_verses(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Index range of the verses on `page`
///
/// # Examples
/// ```
/// use songlib_api::verses::verse_window;
///
/// // 3 verses = 2 pages (2 + 1)
/// assert_eq!(verse_window(3, 1).unwrap(), 0..2);
/// assert_eq!(verse_window(3, 2).unwrap(), 2..3);
/// assert!(verse_window(3, 3).is_err());
/// ```
pub fn verse_window(total_verses: usize, page: usize) -> Result<Range<usize>, VerseError> {
    if page == 0 {
        return Err(VerseError::InvalidPage);
    }

    let out_of_range = VerseError::PageOutOfRange { page, total_verses };
    let start = (page - 1)
        .checked_mul(VERSES_PER_PAGE)
        .ok_or_else(|| out_of_range.clone())?;
    if start >= total_verses {
        return Err(out_of_range);
    }

    let end = (start + VERSES_PER_PAGE).min(total_verses);
    Ok(start..end)
}

/// Slice the verses of `text` for a 1-indexed page
pub fn paginate(text: &str, page: usize) -> Result<VersePage<'_>, VerseError> {
    let verses = split_verses(text);
    let window = verse_window(verses.len(), page)?;

    Ok(VersePage {
        page,
        total_verses: verses.len(),
        verses: verses[window].to_vec(),
    })
}
