//! HTML infobox scraping
//!
//! Fallback used when a page has no usable `__NEXT_DATA__`. The page is
//! streamed once through `lol_html`; the handlers record the infobox stat
//! blocks, their rows and split cells, the section captions and every
//! paragraph. The collected layout is then interpreted into an [`Enrichment`].

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::TextChunk;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use tracing::debug;

use crate::data::{AptitudeCategory, AptitudeKind, Enrichment, Grade, Rarity};

const STATS_BLOCK: &str = "div.characters_infobox_stats__MHrw9";
const ROW: &str = "div.characters_infobox_row__RNXnI";
const ROW_IN_BLOCK: &str = "div.characters_infobox_stats__MHrw9 div.characters_infobox_row__RNXnI";
const ROW_SPLIT: &str = "div.characters_infobox_row_split__AgKVj";
const STAT_ICON: &str = "span.utils_stat_icon__J4nu0 img";
const CAPTION: &str = "div.characters_infobox_caption__UHck_";

const STAR: char = '⭐';

const SKILL_CAPTIONS: &[&str] = &["skill", "能力", "イベント"];
const RELATIONSHIP_CAPTIONS: &[&str] = &["relationship", "story", "出身", "関係"];
const BIOGRAPHY_EXCLUDES: &[&str] = &["speed", "stamina", "skill", "strategy"];

/// One `characters_infobox_row`
#[derive(Debug, Clone, Default)]
struct Row {
    /// Index of the enclosing stats block
    block: Option<usize>,
    /// Index of the most recent caption seen before the row
    caption: Option<usize>,
    text: String,
    icon_alt: Option<String>,
    splits: Vec<String>,
}

impl Row {
    fn text(&self) -> String {
        normalize(&self.text)
    }
}

#[derive(Debug, Clone, Default)]
struct Layout {
    blocks: Vec<String>,
    captions: Vec<String>,
    rows: Vec<Row>,
    paragraphs: Vec<String>,
}

/// Appends a chunk, separating text nodes with a space
fn push_chunk(buffer: &mut String, chunk: &TextChunk) {
    buffer.push_str(chunk.as_str());
    if chunk.last_in_text_node() {
        buffer.push(' ');
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let text = text.to_lowercase();
    needles.iter().any(|needle| text.contains(needle))
}

fn scan(html: &str) -> Layout {
    let layout = Rc::new(RefCell::new(Layout::default()));

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(STATS_BLOCK, {
                    let layout = Rc::clone(&layout);
                    move |_| {
                        layout.borrow_mut().blocks.push(String::new());
                        Ok(())
                    }
                }),
                text!(STATS_BLOCK, {
                    let layout = Rc::clone(&layout);
                    move |chunk| {
                        if let Some(block) = layout.borrow_mut().blocks.last_mut() {
                            push_chunk(block, chunk);
                        }
                        Ok(())
                    }
                }),
                element!(CAPTION, {
                    let layout = Rc::clone(&layout);
                    move |_| {
                        layout.borrow_mut().captions.push(String::new());
                        Ok(())
                    }
                }),
                text!(CAPTION, {
                    let layout = Rc::clone(&layout);
                    move |chunk| {
                        if let Some(caption) = layout.borrow_mut().captions.last_mut() {
                            push_chunk(caption, chunk);
                        }
                        Ok(())
                    }
                }),
                element!(ROW, {
                    let layout = Rc::clone(&layout);
                    move |_| {
                        let mut layout = layout.borrow_mut();
                        let caption = layout.captions.len().checked_sub(1);
                        layout.rows.push(Row {
                            caption,
                            ..Row::default()
                        });
                        Ok(())
                    }
                }),
                element!(ROW_IN_BLOCK, {
                    let layout = Rc::clone(&layout);
                    move |_| {
                        let mut layout = layout.borrow_mut();
                        let block = layout.blocks.len().checked_sub(1);
                        if let Some(row) = layout.rows.last_mut() {
                            row.block = block;
                        }
                        Ok(())
                    }
                }),
                text!(ROW, {
                    let layout = Rc::clone(&layout);
                    move |chunk| {
                        if let Some(row) = layout.borrow_mut().rows.last_mut() {
                            push_chunk(&mut row.text, chunk);
                        }
                        Ok(())
                    }
                }),
                element!(STAT_ICON, {
                    let layout = Rc::clone(&layout);
                    move |el| {
                        if let Some(row) = layout.borrow_mut().rows.last_mut() {
                            if row.icon_alt.is_none() {
                                row.icon_alt = el.get_attribute("alt");
                            }
                        }
                        Ok(())
                    }
                }),
                element!(ROW_SPLIT, {
                    let layout = Rc::clone(&layout);
                    move |_| {
                        if let Some(row) = layout.borrow_mut().rows.last_mut() {
                            row.splits.push(String::new());
                        }
                        Ok(())
                    }
                }),
                text!(ROW_SPLIT, {
                    let layout = Rc::clone(&layout);
                    move |chunk| {
                        let mut layout = layout.borrow_mut();
                        let split = layout.rows.last_mut().and_then(|row| row.splits.last_mut());
                        if let Some(split) = split {
                            push_chunk(split, chunk);
                        }
                        Ok(())
                    }
                }),
                element!("p", {
                    let layout = Rc::clone(&layout);
                    move |_| {
                        layout.borrow_mut().paragraphs.push(String::new());
                        Ok(())
                    }
                }),
                text!("p", {
                    let layout = Rc::clone(&layout);
                    move |chunk| {
                        if let Some(paragraph) = layout.borrow_mut().paragraphs.last_mut() {
                            push_chunk(paragraph, chunk);
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    );
    if let Err(err) = result {
        debug!(error = %err, "Infobox scan stopped early; using what was collected");
    }

    Rc::try_unwrap(layout)
        .map(RefCell::into_inner)
        .unwrap_or_else(|rc| {
            let layout = rc.borrow().clone();
            layout
        })
}

/// Which stat an infobox icon stands for, by its alt text
fn assign_stat(enrichment: &mut Enrichment, icon_alt: &str, value: u32) {
    let alt = icon_alt.to_lowercase();
    let slot = if alt.contains("speed") {
        &mut enrichment.speed
    } else if alt.contains("stamina") {
        &mut enrichment.stamina
    } else if alt.contains("power") {
        &mut enrichment.power
    } else if alt.contains("guts") {
        &mut enrichment.guts
    } else if alt.contains("intelligence") || alt.contains("wit") {
        &mut enrichment.intelligence
    } else {
        return;
    };
    *slot = Some(value);
}

/// Splits a cell such as "Medium A" into its label and grade
fn split_cell(cell: &str) -> Option<(String, Grade)> {
    let tokens: Vec<&str> = cell.split_whitespace().collect();
    let (grade, label) = tokens.split_last()?;
    if label.is_empty() {
        return None;
    }
    Some((label.join(" "), Grade::parse(grade)?))
}

fn block_categories(block_text: &str) -> Vec<AptitudeCategory> {
    let text = block_text.to_lowercase();
    [
        ("surface", AptitudeCategory::Surface),
        ("distance", AptitudeCategory::Distance),
        ("strategy", AptitudeCategory::Strategy),
    ]
    .into_iter()
    .filter(|(heading, _)| text.contains(heading))
    .map(|(_, category)| category)
    .collect()
}

fn read_stats_and_aptitudes(layout: &Layout, enrichment: &mut Enrichment) {
    for row in layout.rows.iter().filter(|row| row.block.is_some()) {
        let text = row.text();

        let stars = text.chars().filter(|c| *c == STAR).count();
        if stars > 0 {
            enrichment.rarity = Some(Rarity::from_stars(stars as u32));
            continue;
        }

        if let Some(alt) = &row.icon_alt {
            let value = text
                .split_whitespace()
                .find(|token| token.chars().all(|c| c.is_ascii_digit()))
                .and_then(|token| token.parse().ok());
            if let Some(value) = value {
                assign_stat(enrichment, alt, value);
            }
        }
    }

    for (index, block) in layout.blocks.iter().enumerate() {
        let categories = block_categories(block);
        if categories.is_empty() {
            continue;
        }

        let cells = layout
            .rows
            .iter()
            .filter(|row| row.block == Some(index))
            .flat_map(|row| row.splits.iter());

        for cell in cells {
            let Some((label, grade)) = split_cell(cell) else {
                continue;
            };
            let kind = categories
                .iter()
                .find_map(|category| AptitudeKind::from_label(*category, &label));
            if let Some(kind) = kind {
                enrichment.aptitudes.insert(kind, grade);
            }
        }
    }
}

/// Distinct row texts under captions matching `headings`, within `len`
fn rows_under_captions(
    layout: &Layout,
    headings: &[&str],
    len: std::ops::Range<usize>,
    reject: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();

    for (index, caption) in layout.captions.iter().enumerate() {
        if !contains_any(caption, headings) {
            continue;
        }
        for row in layout.rows.iter().filter(|row| row.caption == Some(index)) {
            let text = row.text();
            let chars = text.chars().count();
            if len.contains(&chars) && !reject(&text) && !collected.contains(&text) {
                collected.push(text);
            }
        }
    }
    collected
}

fn read_biography(layout: &Layout) -> Option<String> {
    layout
        .paragraphs
        .iter()
        .map(|paragraph| normalize(paragraph))
        .find(|text| text.chars().count() > 50 && !contains_any(text, BIOGRAPHY_EXCLUDES))
}

/// Scrapes an enrichment out of the page markup
///
/// With `include_stats` false only the prose fields (skills, biography,
/// relationships) are read; rarity, stats and aptitudes are left empty.
pub(crate) fn extract(html: &str, include_stats: bool) -> Enrichment {
    let layout = scan(html);
    let mut enrichment = Enrichment::default();

    if include_stats {
        read_stats_and_aptitudes(&layout, &mut enrichment);
    }

    enrichment.skills = rows_under_captions(&layout, SKILL_CAPTIONS, 3..150, |text| {
        text.to_lowercase().contains("skill")
    });
    enrichment.relationships =
        rows_under_captions(&layout, RELATIONSHIP_CAPTIONS, 6..200, |_| false);
    enrichment.biography = read_biography(&layout);

    enrichment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Stats;

    const INFOBOX: &str = r#"
    <html><body>
      <p>Short blurb.</p>
      <p>A cheerful girl from Hokkaido who came to Tokyo to keep a promise made to her mothers.</p>
      <div class="characters_infobox_stats__MHrw9">
        <div class="characters_infobox_row__RNXnI"><div>⭐⭐⭐</div></div>
        <div class="characters_infobox_row__RNXnI">
          <div><span class="utils_stat_icon__J4nu0"><img alt="Speed icon" src="s.png"></span>Speed</div>
          <div>102</div>
        </div>
        <div class="characters_infobox_row__RNXnI">
          <div><span class="utils_stat_icon__J4nu0"><img alt="Stamina icon" src="s.png"></span>Stamina</div>
          <div>87</div>
        </div>
        <div class="characters_infobox_row__RNXnI">
          <div><span class="utils_stat_icon__J4nu0"><img alt="Power icon"></span>Power</div>
          <div>77</div>
        </div>
        <div class="characters_infobox_row__RNXnI">
          <div><span class="utils_stat_icon__J4nu0"><img alt="Guts icon"></span>Guts</div>
          <div>96</div>
        </div>
        <div class="characters_infobox_row__RNXnI">
          <div><span class="utils_stat_icon__J4nu0"><img alt="Wit icon"></span>Wit</div>
          <div>88</div>
        </div>
      </div>
      <div class="characters_infobox_stats__MHrw9">
        <div class="characters_infobox_caption__UHck_">Aptitude</div>
        <div class="characters_infobox_row__RNXnI"><div>Surface</div></div>
        <div class="characters_infobox_row__RNXnI">
          <div class="characters_infobox_row_split__AgKVj"><div>Turf</div><div>A</div></div>
          <div class="characters_infobox_row_split__AgKVj"><div>Dirt</div><div>G</div></div>
        </div>
        <div class="characters_infobox_row__RNXnI"><div>Distance</div></div>
        <div class="characters_infobox_row__RNXnI">
          <div class="characters_infobox_row_split__AgKVj"><div>Short</div><div>F</div></div>
          <div class="characters_infobox_row_split__AgKVj"><div>Mile</div><div>C</div></div>
          <div class="characters_infobox_row_split__AgKVj"><div>Medium</div><div>A</div></div>
          <div class="characters_infobox_row_split__AgKVj"><div>Long</div><div>B</div></div>
        </div>
      </div>
      <div>
        <div class="characters_infobox_caption__UHck_">Unique skills</div>
        <div class="characters_infobox_row__RNXnI">Shooting Star</div>
        <div class="characters_infobox_row__RNXnI">Shooting Star</div>
        <div class="characters_infobox_row__RNXnI">ab</div>
        <div class="characters_infobox_caption__UHck_">Innate skills</div>
        <div class="characters_infobox_row__RNXnI">Corner Recovery</div>
        <div class="characters_infobox_row__RNXnI">Skill points 120</div>
      </div>
      <div>
        <div class="characters_infobox_caption__UHck_">Relationships</div>
        <div class="characters_infobox_row__RNXnI">Silence Suzuka (roommate)</div>
        <div class="characters_infobox_row__RNXnI">x</div>
      </div>
    </body></html>"#;

    #[test]
    fn test_reads_rarity_and_stats_from_icon_rows() {
        let enrichment = extract(INFOBOX, true);

        assert_eq!(enrichment.rarity, Some(Rarity::SR));
        assert_eq!(enrichment.stats(), Some(Stats::new(102, 87, 77, 96, 88)));
    }

    #[test]
    fn test_reads_aptitudes_from_split_cells() {
        let enrichment = extract(INFOBOX, true);

        assert_eq!(enrichment.aptitudes.get(&AptitudeKind::Turf), Some(&Grade::A));
        assert_eq!(enrichment.aptitudes.get(&AptitudeKind::Dirt), Some(&Grade::G));
        assert_eq!(enrichment.aptitudes.get(&AptitudeKind::Short), Some(&Grade::F));
        assert_eq!(enrichment.aptitudes.get(&AptitudeKind::Long), Some(&Grade::B));
        assert_eq!(enrichment.aptitudes.len(), 6);
    }

    #[test]
    fn test_reads_prose_sections() {
        let enrichment = extract(INFOBOX, true);

        assert_eq!(
            enrichment.skills,
            vec!["Shooting Star".to_string(), "Corner Recovery".to_string()]
        );
        assert_eq!(
            enrichment.relationships,
            vec!["Silence Suzuka (roommate)".to_string()]
        );
        assert!(enrichment
            .biography
            .as_deref()
            .is_some_and(|bio| bio.starts_with("A cheerful girl from Hokkaido")));
    }

    #[test]
    fn test_prose_only_mode_skips_stats() {
        let enrichment = extract(INFOBOX, false);

        assert!(enrichment.rarity.is_none());
        assert!(enrichment.stats().is_none());
        assert!(enrichment.aptitudes.is_empty());
        assert_eq!(enrichment.skills.len(), 2);
    }

    #[test]
    fn test_unrelated_markup_yields_nothing() {
        let html = "<html><body><div>404 - page not found</div></body></html>";
        let enrichment = extract(html, true);

        assert!(enrichment.is_empty());
    }

    #[test]
    fn test_split_cell() {
        assert_eq!(split_cell("Medium A"), Some(("Medium".to_string(), Grade::A)));
        assert_eq!(split_cell("Late Surger B"), Some(("Late Surger".to_string(), Grade::B)));
        assert_eq!(split_cell("A"), None);
        assert_eq!(split_cell("Turf ?"), None);
    }
}
