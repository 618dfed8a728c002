//! Stored-file naming.
//!
//! Names follow `<prefix>_<YYYY_MM_DD_HH_MM_SS>_<6 alnum>.<ext>`. The format is
//! public (it appears in asset URLs) and must stay stable.

use chrono::{DateTime, Utc};
use deunicode::deunicode;
use rand::Rng;
use rand::distr::Alphanumeric;

use super::kind::ArModelKind;

/// Prefix used when no product name is available.
pub const AR_MODEL_PREFIX: &str = "ar_model";

/// Prefix used for product images without a product name.
pub const IMAGE_PREFIX: &str = "image";

const RANDOM_SUFFIX_LEN: usize = 6;
const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// Lowercase ASCII slug with `_` separators.
///
/// Non-ASCII letters are transliterated first (`Ghế` becomes `ghe`). Every run
/// of characters outside `[a-z0-9]` then collapses into one `_`, and leading or
/// trailing separators are dropped.
pub fn slugify(name: &str) -> String {
    let folded = deunicode(name);
    let mut slug = String::with_capacity(folded.len());
    let mut pending_sep = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Generate a fresh filename for an AR model.
pub fn ar_model_filename(kind: ArModelKind, product_name: Option<&str>) -> String {
    let prefix = prefix_for(product_name, "ar", AR_MODEL_PREFIX);
    compose(&prefix, kind.extension(), Utc::now(), &mut rand::rng())
}

/// Generate a fresh filename for a product image with the given extension.
pub fn image_filename(extension: &str, product_name: Option<&str>) -> String {
    let prefix = prefix_for(product_name, "img", IMAGE_PREFIX);
    compose(
        &prefix,
        &extension.to_ascii_lowercase(),
        Utc::now(),
        &mut rand::rng(),
    )
}

fn prefix_for(product_name: Option<&str>, tag: &str, fallback: &str) -> String {
    match product_name.map(slugify) {
        Some(slug) if !slug.is_empty() => format!("{slug}_{tag}"),
        _ => fallback.to_string(),
    }
}

fn compose<R: Rng + ?Sized>(
    prefix: &str,
    extension: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let timestamp = now.format(TIMESTAMP_FORMAT);
    let random: String = rng
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}_{timestamp}_{random}.{extension}")
}
