//! `es_systems.xml` integration.
//!
//! ES-DE only shows the synced library once a `greenlight` system exists
//! in the user's custom systems file. This helper appends one if absent,
//! leaving every other byte of the file untouched. It is an optional
//! collaborator: `sync` never calls it.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::GamelistError;
use crate::gamelist::escape_xml;

const SYSTEM_NAME: &str = "greenlight";

const EMPTY_DOC: &str = "<?xml version=\"1.0\"?>\n<systemList>\n</systemList>\n";

/// Ensure the custom systems file contains the Greenlight system.
///
/// Returns `true` if an entry was added, `false` if one already existed.
/// The scripts directory becomes the system's ROM path.
pub fn ensure_system_entry(
    es_systems_path: &Path,
    scripts_dir: &Path,
) -> Result<bool, GamelistError> {
    let contents = if es_systems_path.exists() {
        std::fs::read_to_string(es_systems_path)?
    } else {
        EMPTY_DOC.to_string()
    };

    if has_system(&contents, SYSTEM_NAME)? {
        return Ok(false);
    }

    // Splice the new system in just before the closing tag so the rest
    // of the document round-trips byte-for-byte.
    let insert_at = contents.rfind("</systemList>").ok_or_else(|| {
        GamelistError::Parse("no <systemList> element in es_systems.xml".to_string())
    })?;

    let fragment = system_fragment(scripts_dir);
    let mut out = String::with_capacity(contents.len() + fragment.len());
    out.push_str(&contents[..insert_at]);
    out.push_str(&fragment);
    out.push_str(&contents[insert_at..]);

    if let Some(parent) = es_systems_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = es_systems_path.with_extension("xml.tmp");
    std::fs::write(&tmp, out.as_bytes())?;
    std::fs::rename(&tmp, es_systems_path)?;
    Ok(true)
}

fn system_fragment(scripts_dir: &Path) -> String {
    let path = escape_xml(&scripts_dir.display().to_string());
    let mut xml = String::new();
    xml.push_str("    <system>\n");
    xml.push_str(&format!("        <name>{SYSTEM_NAME}</name>\n"));
    xml.push_str("        <fullname>Xbox Game Pass</fullname>\n");
    xml.push_str(&format!("        <path>{path}</path>\n"));
    xml.push_str("        <extension>.sh</extension>\n");
    xml.push_str("        <command label=\"Greenlight\">bash %ROM%</command>\n");
    xml.push_str("        <platform>xbox</platform>\n");
    xml.push_str(&format!("        <theme>{SYSTEM_NAME}</theme>\n"));
    xml.push_str("    </system>\n");
    xml
}

/// Whether a `<system>` with the given `<name>` already exists.
fn has_system(xml: &str, name: &str) -> Result<bool, GamelistError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_system = false;
    let mut in_name = false;
    loop {
        match reader.read_event() {
            Err(e) => return Err(GamelistError::Parse(e.to_string())),
            Ok(Event::Eof) => return Ok(false),
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"system" => in_system = true,
                b"name" if in_system => in_name = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_name => {
                let text = t
                    .unescape()
                    .map_err(|e| GamelistError::Parse(e.to_string()))?;
                if text.trim().eq_ignore_ascii_case(name) {
                    return Ok(true);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"system" => in_system = false,
                b"name" => in_name = false,
                _ => {}
            },
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/systems_tests.rs"]
mod tests;
