//! Output formatting for search results.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::index::{ApiId, Match};

/// A de-duplicated search hit, optionally resolved to its display name.
#[derive(Debug, Clone)]
pub struct Hit {
    pub id: ApiId,
    pub offset: u32,
    pub name: Option<String>,
}

impl Hit {
    pub fn new(m: Match, name: Option<String>) -> Self {
        Self {
            id: m.id,
            offset: m.offset,
            name,
        }
    }
}

/// Print search hits, highlighting the matched substring when the display
/// name is known.
pub fn print_hits(hits: &[Hit], query: &str, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for hit in hits {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{:>8}", hit.id)?;
        stdout.reset()?;
        write!(stdout, "  ")?;

        match &hit.name {
            Some(name) => print_highlighted(&mut stdout, name, query)?,
            None => write!(stdout, "(offset {})", hit.offset)?,
        }
        writeln!(stdout)?;
    }

    Ok(())
}

/// Print a display name with the first occurrence of `query` highlighted.
fn print_highlighted(stdout: &mut StandardStream, name: &str, query: &str) -> io::Result<()> {
    let needle = query.to_lowercase();
    let lowered = name.to_lowercase();

    // Map the match range found in the lowercased name back onto the
    // original. Lowercasing can shift byte offsets for some scripts; fall
    // back to an unhighlighted print when the range does not line up.
    let span = lowered.find(&needle).and_then(|start| {
        let end = start + needle.len();
        name.get(..start)
            .zip(name.get(start..end))
            .zip(name.get(end..))
    });

    match span {
        Some(((before, matched), after)) => {
            write!(stdout, "{}", before)?;
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(stdout, "{}", matched)?;
            stdout.reset()?;
            write!(stdout, "{}", after)
        }
        None => write!(stdout, "{}", name),
    }
}
