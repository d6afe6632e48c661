// Extended M3U playlist decoding for `/api/channels.m3u`.
//
// dizqueTV emits one `#EXTINF` line per channel followed by its stream
// URL. Attributes are `key="value"` pairs; the display title follows the
// first comma outside quotes.

use std::collections::BTreeMap;

use crate::error::Error;

/// A parsed `#EXTM3U` playlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    /// Attributes on the `#EXTM3U` header line (`url-tvg`, `x-tvg-url`, ...).
    pub attributes: BTreeMap<String, String>,
    pub entries: Vec<PlaylistEntry>,
}

/// One `#EXTINF` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistEntry {
    /// Seconds; `-1` or `0` for live streams.
    pub duration: f64,
    pub attributes: BTreeMap<String, String>,
    pub title: String,
    pub uri: String,
}

impl PlaylistEntry {
    /// Channel number from `tvg-chno`, if present and numeric.
    pub fn channel_number(&self) -> Option<u32> {
        self.attributes.get("tvg-chno")?.parse().ok()
    }
}

impl Playlist {
    /// Find the entry for a channel number.
    pub fn channel(&self, number: u32) -> Option<&PlaylistEntry> {
        self.entries
            .iter()
            .find(|e| e.channel_number() == Some(number))
    }
}

/// Parse extended M3U text.
pub fn parse(text: &str) -> Result<Playlist, Error> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::Playlist("empty playlist".into()))?;
    let header_rest = header
        .trim_start_matches('\u{feff}')
        .strip_prefix("#EXTM3U")
        .ok_or_else(|| Error::Playlist(format!("missing #EXTM3U header, got {header:?}")))?;

    let mut playlist = Playlist {
        attributes: parse_attributes(header_rest),
        entries: Vec::new(),
    };

    let mut pending: Option<PlaylistEntry> = None;
    for line in lines {
        if let Some(info) = line.strip_prefix("#EXTINF:") {
            if let Some(prev) = &pending {
                return Err(Error::Playlist(format!(
                    "entry {:?} has no stream URL",
                    prev.title
                )));
            }
            pending = Some(parse_extinf(info)?);
        } else if line.starts_with('#') {
            // Other directives carry nothing dizqueTV emits.
        } else if let Some(mut entry) = pending.take() {
            entry.uri = line.to_owned();
            playlist.entries.push(entry);
        } else {
            // Bare URL without metadata.
            playlist.entries.push(PlaylistEntry {
                duration: -1.0,
                uri: line.to_owned(),
                ..PlaylistEntry::default()
            });
        }
    }

    if let Some(entry) = pending {
        return Err(Error::Playlist(format!(
            "entry {:?} has no stream URL",
            entry.title
        )));
    }

    Ok(playlist)
}

fn parse_extinf(info: &str) -> Result<PlaylistEntry, Error> {
    let (meta, title) = split_title(info);
    let meta = meta.trim();
    let (duration_str, attrs) = meta.split_once(char::is_whitespace).unwrap_or((meta, ""));
    let duration = duration_str
        .parse::<f64>()
        .map_err(|_| Error::Playlist(format!("invalid EXTINF duration {duration_str:?}")))?;

    Ok(PlaylistEntry {
        duration,
        attributes: parse_attributes(attrs),
        title: title.trim().to_owned(),
        uri: String::new(),
    })
}

/// Split at the first comma outside double quotes.
fn split_title(info: &str) -> (&str, &str) {
    let mut in_quotes = false;
    for (i, c) in info.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&info[..i], &info[i + 1..]),
            _ => {}
        }
    }
    (info, "")
}

fn parse_attributes(s: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    let mut rest = s.trim_start();

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim();
        let after = &rest[eq + 1..];

        let (value, remainder) = if let Some(quoted) = after.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            (&after[..end], &after[end..])
        };

        if !key.is_empty() {
            attrs.insert(key.to_owned(), value.to_owned());
        }
        rest = remainder.trim_start();
    }

    attrs
}
