use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use greenlight_sync_core::{AssetKind, LocalGameRecord};

use crate::error::GamelistError;

/// One `<game>` node: an ordered, flat list of tag → text fields.
///
/// ES-DE gamelist nodes are flat; markup nested deeper than one level
/// inside a field is flattened to its text content.
#[derive(Debug, Clone, PartialEq)]
pub struct GameNode {
    pub fields: Vec<(String, String)>,
}

impl GameNode {
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Stem of the `<path>` field, the game id for managed nodes.
    pub fn path_stem(&self) -> Option<String> {
        let path = self.get("path")?;
        Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }
}

/// Parse an existing gamelist. An absent file is an empty list; malformed
/// XML is a [`GamelistError::Parse`] and nothing gets written.
pub fn parse_gamelist(path: &Path) -> Result<Vec<GameNode>, GamelistError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)?;
    parse_gamelist_str(&contents)
}

fn parse_gamelist_str(xml: &str) -> Result<Vec<GameNode>, GamelistError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = Vec::new();
    loop {
        match reader.read_event() {
            Err(e) => return Err(GamelistError::Parse(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) if e.name().as_ref() == b"game" => {
                nodes.push(parse_game_node(&mut reader)?);
            }
            Ok(_) => {}
        }
    }
    Ok(nodes)
}

fn parse_game_node(reader: &mut Reader<&[u8]>) -> Result<GameNode, GamelistError> {
    let mut fields = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut nested = 0usize;

    loop {
        match reader.read_event() {
            Err(e) => return Err(GamelistError::Parse(e.to_string())),
            Ok(Event::Eof) => {
                return Err(GamelistError::Parse(
                    "unexpected end of file inside <game>".to_string(),
                ));
            }
            Ok(Event::Start(e)) => {
                if current.is_none() {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    current = Some((tag, String::new()));
                    nested = 0;
                } else {
                    nested += 1;
                }
            }
            Ok(Event::Empty(e)) => {
                if current.is_none() {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    fields.push((tag, String::new()));
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((_, value)) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| GamelistError::Parse(e.to_string()))?;
                    value.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(e)) => {
                if current.is_some() {
                    if nested == 0 {
                        if let Some(field) = current.take() {
                            fields.push(field);
                        }
                    } else {
                        nested -= 1;
                    }
                } else if e.name().as_ref() == b"game" {
                    return Ok(GameNode { fields });
                }
            }
            Ok(_) => {}
        }
    }
}

/// Merge the final record set into the gamelist.
///
/// `managed_ids` is every id this sync has ever been responsible for in
/// this run (final set plus removals plus previously recorded ids).
/// Managed nodes are rebuilt in place from their record or dropped when
/// no longer in the final set; new games are appended ordered by sort
/// title; nodes with any other path are preserved untouched.
pub fn apply_diff(
    gamelist_path: &Path,
    final_records: &BTreeMap<String, LocalGameRecord>,
    managed_ids: &HashSet<String>,
) -> Result<(), GamelistError> {
    let existing = parse_gamelist(gamelist_path)?;

    let mut written: HashSet<String> = HashSet::new();
    let mut out: Vec<GameNode> = Vec::new();

    for node in existing {
        match node.path_stem() {
            Some(stem) if managed_ids.contains(&stem) => {
                if let Some(record) = final_records.get(&stem) {
                    if written.insert(stem) {
                        out.push(node_from_record(record));
                    }
                }
                // Stale or duplicate managed node: dropped.
            }
            _ => out.push(node),
        }
    }

    let mut appended: Vec<&LocalGameRecord> = final_records
        .values()
        .filter(|r| !written.contains(&r.id))
        .collect();
    appended.sort_by(|a, b| a.sort_title.cmp(&b.sort_title).then(a.id.cmp(&b.id)));
    for record in appended {
        out.push(node_from_record(record));
    }

    write_gamelist(gamelist_path, &out)
}

/// Build the gamelist node for a synced game.
fn node_from_record(record: &LocalGameRecord) -> GameNode {
    let mut fields = Vec::new();
    let script_name = record
        .script_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&record.id);
    fields.push(("path".to_string(), format!("./{script_name}")));
    fields.push(("name".to_string(), record.title.clone()));
    if record.sort_title != record.title {
        fields.push(("sortname".to_string(), record.sort_title.clone()));
    }
    if let Some(ref desc) = record.description {
        fields.push(("desc".to_string(), desc.clone()));
    }
    if let Some(ref dev) = record.developer {
        fields.push(("developer".to_string(), dev.clone()));
    }
    if let Some(ref date) = record.release_date {
        fields.push(("releasedate".to_string(), format_release_date(date)));
    }
    for kind in AssetKind::ALL {
        if let Some(path) = record.asset_paths.get(&kind) {
            fields.push((kind.gamelist_tag().to_string(), path.display().to_string()));
        }
    }
    GameNode { fields }
}

fn write_gamelist(path: &Path, nodes: &[GameNode]) -> Result<(), GamelistError> {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\"?>\n");
    xml.push_str("<gameList>\n");
    for node in nodes {
        xml.push_str("  <game>\n");
        for (tag, value) in &node.fields {
            write_tag(&mut xml, tag, value);
        }
        xml.push_str("  </game>\n");
    }
    xml.push_str("</gameList>\n");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("xml.tmp");
    std::fs::write(&tmp, xml.as_bytes())?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn write_tag(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("    <");
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Convert a YYYYMMDD (or YYYY-MM-DD) date to ES-DE's YYYYMMDDTHHMMSS form.
fn format_release_date(date: &str) -> String {
    let cleaned = date.replace('-', "");
    if cleaned.len() >= 8 {
        format!("{}T000000", &cleaned[..8])
    } else {
        format!("{cleaned}T000000")
    }
}

#[cfg(test)]
#[path = "tests/gamelist_tests.rs"]
mod tests;
