//! Media locator (URL) → media host public id.
//!
//! The host addresses assets by `folder/name`; stored locators are delivery
//! URLs such as `https://res.example.com/demo/image/upload/v17/products/ring.jpg`.
//! The public id is taken to be the last two path segments with the file
//! extension removed (`products/ring`). This is lossy: assets uploaded without
//! a folder resolve to the wrong id, and callers must treat the result as a
//! best guess.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::{ParseError, Url};

static PUBLIC_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([^/]+/[^/]+?)(?:\.[^/.]+)?$").expect("public id pattern is valid")
});

/// Base for scheme-less locators such as `/shop/ring.jpg`.
static RELATIVE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("base url is valid"));

/// Best-effort public id for `locator`. `None` when the locator does not
/// parse or its path has fewer than two segments.
pub fn public_id_from_locator(locator: &str) -> Option<String> {
    let path = url_path(locator.trim())?;
    PUBLIC_ID
        .captures(&path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decoded path of `locator`; query and fragment are dropped by the parser.
fn url_path(locator: &str) -> Option<String> {
    let url = match Url::parse(locator) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => RELATIVE_BASE.join(locator).ok()?,
        Err(_) => return None,
    };
    Some(percent_decode_str(url.path()).decode_utf8_lossy().into_owned())
}
