//! Structured page data embedded by the wiki's Next.js frontend
//!
//! Character pages ship their card data as JSON inside
//! `<script id="__NEXT_DATA__">`. When present it is the fastest and most
//! complete source: `props.pageProps.itemData` carries the star rarity, the
//! five base stats and the ten aptitude grades.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{rewrite_str, text, RewriteStrSettings};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::data::{AptitudeKind, Enrichment, Grade, Rarity, Stats};

const ITEM_DATA_POINTER: &str = "/props/pageProps/itemData";

/// The subset of `itemData` this crate reads
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemData {
    rarity: Option<u32>,
    base_stats: Vec<u32>,
    aptitude: Vec<String>,
}

/// Returns the raw text of the `__NEXT_DATA__` script, if the page has one
pub(crate) fn script_text(html: &str) -> Option<String> {
    let buffer = Rc::new(RefCell::new(String::new()));

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![text!("script#__NEXT_DATA__", {
                let buffer = Rc::clone(&buffer);
                move |chunk| {
                    buffer.borrow_mut().push_str(chunk.as_str());
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    );
    if let Err(err) = result {
        debug!(error = %err, "Page could not be fully scanned for __NEXT_DATA__");
    }

    let script = buffer.borrow().trim().to_string();
    (!script.is_empty()).then_some(script)
}

/// Reads rarity, base stats and aptitudes from the embedded JSON
///
/// Returns `None` when the script is missing, is not JSON, or has no
/// `itemData`. Arrays shorter than expected are skipped rather than partially
/// applied.
pub(crate) fn extract(html: &str) -> Option<Enrichment> {
    let script = script_text(html)?;
    let root: Value = match serde_json::from_str(&script) {
        Ok(root) => root,
        Err(err) => {
            debug!(error = %err, "__NEXT_DATA__ is not valid JSON");
            return None;
        }
    };

    let item = root.pointer(ITEM_DATA_POINTER)?.clone();
    let item: ItemData = serde_json::from_value(item)
        .inspect_err(|err| debug!(error = %err, "Unexpected itemData shape"))
        .ok()?;

    let mut enrichment = Enrichment {
        rarity: item.rarity.map(Rarity::from_stars),
        ..Enrichment::default()
    };

    if let [speed, stamina, power, guts, intelligence, ..] = item.base_stats[..] {
        enrichment.set_stats(Stats::new(speed, stamina, power, guts, intelligence));
    }

    if item.aptitude.len() >= AptitudeKind::ALL.len() {
        for (kind, grade) in AptitudeKind::ALL.into_iter().zip(&item.aptitude) {
            if let Some(grade) = Grade::parse(grade) {
                enrichment.aptitudes.insert(kind, grade);
            }
        }
    }

    Some(enrichment)
}
