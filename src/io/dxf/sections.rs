//! Section-level state machine.
//!
//! The top-level dispatcher hands each record to the handler for the
//! current document section.  `(0, "SECTION")` and `(0, "ENDSEC")` drop
//! back to the unknown state from anywhere; a `(2, name)` record seen while
//! unknown selects the next section.

use super::record_reader::CodePair;
use super::{Block, DxfConverter};
use crate::notification::NotificationType;
use crate::types::Vector3;
use std::io::Read;
use std::rc::Rc;

/// Top-level document sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Unknown,
    Header,
    Classes,
    Tables,
    Blocks,
    Entities,
    Objects,
    Thumbnail,
}

/// Sub-states of the TABLES section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableState {
    Unknown,
    Layer,
}

/// Header variables with a pending write-through slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderVariable {
    Units,
    SplineSegments,
    ColorByLayer,
}

/// In-progress BLOCK definition capture.
#[derive(Debug, Default)]
pub(crate) struct BlockCapture {
    pub name: Option<String>,
    pub handle: String,
    pub base: Vector3,
    pub records: Vec<CodePair>,
    /// Set once the first entity record appears; header codes (2, 5,
    /// 10/20/30) are only interpreted before that.
    pub header_done: bool,
}

/// Replace characters a geometry sink cannot accept in object names.
pub(crate) fn scrub_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c == '/' || c == '[' || c == ']' || c == '*' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

impl<R: Read> DxfConverter<R> {
    /// Between sections: look for the next section keyword.
    pub(crate) fn unknown_code(&mut self, pair: &CodePair) {
        match pair.code {
            0 => {
                // SECTION / ENDSEC both leave us where we are
            }
            2 => match pair.value.as_str() {
                "HEADER" => self.section = Section::Header,
                "CLASSES" => self.section = Section::Classes,
                "TABLES" => {
                    self.section = Section::Tables;
                    self.table_state = TableState::Unknown;
                }
                "BLOCKS" => self.section = Section::Blocks,
                "ENTITIES" => {
                    self.section = Section::Entities;
                    self.entity_state = super::EntityState::Unknown;
                }
                "OBJECTS" => self.section = Section::Objects,
                "THUMBNAILIMAGE" => self.section = Section::Thumbnail,
                _ => {}
            },
            62 => self.curr_color = pair.as_i32(),
            _ => {}
        }
    }

    /// HEADER: bind a pending variable on code 9, write it on code 70/62.
    pub(crate) fn header_code(&mut self, pair: &CodePair) {
        match pair.code {
            0 => {
                if pair.value == "SECTION" || pair.value == "ENDSEC" {
                    self.section = Section::Unknown;
                }
            }
            9 => {
                self.pending_header_var = match pair.value.as_str() {
                    "$INSUNITS" => Some(HeaderVariable::Units),
                    "$SPLINESEGS" => Some(HeaderVariable::SplineSegments),
                    "$CECOLOR" => Some(HeaderVariable::ColorByLayer),
                    _ => None,
                };
            }
            70 | 62 => {
                if let Some(var) = self.pending_header_var.take() {
                    let value = pair.as_i32();
                    match var {
                        HeaderVariable::Units => self.set_units(value),
                        HeaderVariable::SplineSegments => {
                            if value > 0 {
                                self.spline_segs = value as usize;
                            }
                        }
                        HeaderVariable::ColorByLayer => self.color_by_layer = value != 0,
                    }
                }
            }
            _ => {}
        }
    }

    fn set_units(&mut self, selector: i32) {
        if (0..=20).contains(&selector) {
            self.units_factor = super::UNIT_FACTORS[selector as usize];
        } else {
            self.notify(
                NotificationType::Warning,
                format!("unit selector {selector} out of range, treating as unitless"),
            );
            self.units_factor = 1.0;
        }
    }

    /// CLASSES / OBJECTS / THUMBNAILIMAGE: consume until the section ends.
    pub(crate) fn passthrough_code(&mut self, pair: &CodePair) {
        if pair.code == 0 && (pair.value == "SECTION" || pair.value == "ENDSEC") {
            self.section = Section::Unknown;
        }
    }

    pub(crate) fn tables_code(&mut self, pair: &CodePair) {
        match self.table_state {
            TableState::Unknown => self.tables_unknown_code(pair),
            TableState::Layer => self.tables_layer_code(pair),
        }
    }

    fn tables_unknown_code(&mut self, pair: &CodePair) {
        if pair.code != 0 {
            return;
        }
        match pair.value.as_str() {
            "LAYER" => {
                self.pending_layer_name = None;
                self.pending_layer_color = 0;
                self.table_state = TableState::Layer;
            }
            "ENDTAB" => {
                self.pending_layer_name = None;
                self.pending_layer_color = 0;
            }
            "SECTION" | "ENDSEC" => self.section = Section::Unknown,
            _ => {}
        }
    }

    fn tables_layer_code(&mut self, pair: &CodePair) {
        match pair.code {
            2 => self.pending_layer_name = Some(scrub_name(&pair.value)),
            62 => self.pending_layer_color = pair.as_i32(),
            0 => {
                if let Some(name) = self.pending_layer_name.take() {
                    // both fields must be present; color 0 is "unset"
                    if self.pending_layer_color != 0 {
                        self.layers.get_or_create(
                            &name,
                            self.pending_layer_color,
                            self.config.ignore_colors,
                            self.color_by_layer,
                        );
                    }
                }
                self.pending_layer_color = 0;
                self.table_state = TableState::Unknown;
                self.tables_unknown_code(pair);
            }
            _ => {}
        }
    }

    /// BLOCKS: record definitions for later replay.
    pub(crate) fn blocks_code(&mut self, pair: &CodePair) {
        if pair.code == 0 {
            match pair.value.as_str() {
                "SECTION" | "ENDSEC" => {
                    if self.capture.take().is_some() {
                        self.notify(
                            NotificationType::Warning,
                            "section ended inside a BLOCK definition",
                        );
                    }
                    self.section = Section::Unknown;
                }
                "BLOCK" => {
                    if self.capture.is_some() {
                        self.notify(
                            NotificationType::Warning,
                            "BLOCK begun inside a BLOCK definition, previous definition dropped",
                        );
                    }
                    self.capture = Some(BlockCapture::default());
                }
                "ENDBLK" => {
                    if let Some(mut capture) = self.capture.take() {
                        capture.records.push(pair.clone());
                        self.finish_block(capture);
                    }
                }
                _ => {
                    if let Some(capture) = self.capture.as_mut() {
                        capture.header_done = true;
                        capture.records.push(pair.clone());
                    }
                }
            }
            return;
        }

        let scale = self.coord_scale();
        if let Some(capture) = self.capture.as_mut() {
            if !capture.header_done {
                match pair.code {
                    2 => {
                        if capture.name.is_none() {
                            capture.name = Some(pair.value.clone());
                        }
                    }
                    5 => {
                        if capture.handle.is_empty() {
                            capture.handle = pair.value.clone();
                        }
                    }
                    10 | 20 | 30 => {
                        let axis = (pair.code / 10 - 1) as usize;
                        capture.base.set_coord(axis, pair.as_f64() * scale);
                    }
                    _ => {}
                }
            }
            capture.records.push(pair.clone());
        }
    }

    fn finish_block(&mut self, capture: BlockCapture) {
        match capture.name {
            Some(name) => {
                self.blocks.insert(
                    name.clone(),
                    Block {
                        name,
                        handle: capture.handle,
                        base: capture.base,
                        records: Rc::new(capture.records),
                    },
                );
            }
            None => self.notify(
                NotificationType::Warning,
                "unnamed BLOCK definition ignored",
            ),
        }
    }
}
