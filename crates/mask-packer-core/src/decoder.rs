//! Line-oriented decoder for plain-text atlas files.
//!
//! The grammar is state dependent: a line's meaning depends on whether a page is open, whether
//! the page has a name yet and whether a sprite header has been seen on it.
//!
//! ```text
//!
//! page.png                 <- page name (first non-blank line of a block)
//! size: 256,128            <- page fields until the first sprite header
//! filter: Linear,Linear
//! hero                     <- sprite header (no `:`)
//!   bounds: 0,0,50,50      <- sprite fields
//!   rotate: true
//!                          <- blank line closes the page
//! second.png
//! ...
//! ```

use std::io::{BufRead, BufReader, Read};

use tracing::{debug, trace};

use crate::error::{MaskPackerError, Result};
use crate::fields::{PAGE_FIELDS, SPRITE_FIELDS, assign};
use crate::model::{Page, Sprite};

/// Incremental atlas decoder. Feed it lines with [`AtlasDecoder::feed_line`] and collect the
/// pages with [`AtlasDecoder::finish`], or use [`decode_atlas`] / [`decode_atlas_str`].
#[derive(Debug, Default)]
pub struct AtlasDecoder {
    pages: Vec<Page>,
    current: Option<PageBuilder>,
    line: usize,
}

#[derive(Debug, Default)]
struct PageBuilder {
    page: Page,
    /// Sprite whose header has been seen and which is still receiving fields.
    sprite: Option<Sprite>,
    /// Non-blank lines consumed after the page was opened.
    lines: usize,
}

impl PageBuilder {
    fn named(name: &str) -> Self {
        Self {
            page: Page {
                name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn open_sprite(&mut self, name: &str) {
        self.close_sprite();
        self.sprite = Some(Sprite {
            name: name.to_string(),
            ..Default::default()
        });
    }

    fn close_sprite(&mut self) {
        if let Some(mut sprite) = self.sprite.take() {
            apply_default_offsets(&mut sprite);
            self.page.sprites.push(sprite);
        }
    }

    /// Returns `None` for a block that never received any content.
    fn finish(mut self) -> Option<Page> {
        self.close_sprite();
        if self.page.name.is_empty() && self.lines == 0 {
            return None;
        }
        Some(self.page)
    }
}

/// A sprite without trim metadata is exactly its packed size.
pub fn apply_default_offsets(sprite: &mut Sprite) {
    if sprite.offsets.is_unset() {
        sprite.offsets.original_size = sprite.bounds.size;
    }
}

impl AtlasDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consumes one line (without its terminator; a trailing `\r` is tolerated).
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line += 1;
        let line_no = self.line;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.trim().is_empty() {
            self.close_page();
            self.current = Some(PageBuilder::default());
            return Ok(());
        }

        let Some(builder) = self.current.as_mut() else {
            self.current = Some(PageBuilder::named(line.trim()));
            return Ok(());
        };
        builder.lines += 1;

        if !line.contains(':') {
            if builder.page.name.is_empty() {
                builder.page.name = line.trim().to_string();
            } else {
                builder.open_sprite(line.trim());
            }
            return Ok(());
        }

        let (key, value) = split_field(line, line_no)?;
        let known = match builder.sprite.as_mut() {
            Some(sprite) => assign(SPRITE_FIELDS, sprite, key, value, line_no)?,
            None => {
                let known = assign(PAGE_FIELDS, &mut builder.page, key, value, line_no)?;
                let size = builder.page.size;
                if size.x < 0 || size.y < 0 {
                    return Err(MaskPackerError::format(
                        line_no,
                        format!("page size must not be negative, got {size}"),
                    ));
                }
                known
            }
        };
        if !known {
            trace!(line = line_no, key, "ignoring unknown field");
        }
        Ok(())
    }

    /// Closes the open page (if any) and returns every decoded page in input order.
    pub fn finish(mut self) -> Vec<Page> {
        self.close_page();
        debug!(
            pages = self.pages.len(),
            lines = self.line,
            "atlas decoded"
        );
        self.pages
    }

    fn close_page(&mut self) {
        if let Some(page) = self.current.take().and_then(PageBuilder::finish) {
            self.pages.push(page);
        }
    }
}

/// Splits `key: value` on the first colon and trims both sides.
fn split_field(line: &str, line_no: usize) -> Result<(&str, &str)> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| MaskPackerError::format(line_no, "expected `key: value`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(MaskPackerError::format(
            line_no,
            format!("missing field name in {line:?}"),
        ));
    }
    Ok((key, value.trim()))
}

/// Decodes a whole atlas held in memory.
pub fn decode_atlas_str(text: &str) -> Result<Vec<Page>> {
    let decoder = text
        .lines()
        .try_fold(AtlasDecoder::new(), |mut decoder, line| {
            decoder.feed_line(line)?;
            Ok::<_, MaskPackerError>(decoder)
        })?;
    Ok(decoder.finish())
}

/// Decodes an atlas from any reader. Invalid UTF-8 surfaces as an I/O error.
pub fn decode_atlas<R: Read>(reader: R) -> Result<Vec<Page>> {
    let mut decoder = AtlasDecoder::new();
    for line in BufReader::new(reader).lines() {
        decoder.feed_line(&line?)?;
    }
    Ok(decoder.finish())
}
