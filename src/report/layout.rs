//! Cursor-based page writer for compliance reports.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner, so the
//! cursor's `y` decreases as blocks are placed. The only pagination trigger is
//! [`LayoutEngine::place_entry`]; every other block is sized so it always fits
//! where it is placed.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use super::format::{
    format_amount, format_applicator, format_area, format_chemical, format_consent,
    format_date_time, format_location, format_weather, or_not_specified,
};
use super::model::ApplicationRecord;
use super::pdf::encode_win_ansi;
use super::policy::{JurisdictionPolicy, OptionalField};

const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 13.0;
const LABEL_SIZE: f32 = 11.0;
const SMALL_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 9.0;

pub const HEADER_HEIGHT: f32 = 108.0;
pub const GROUP_HEADER_HEIGHT: f32 = 30.0;
const BANNER_HEIGHT: f32 = 22.0;
pub const PLACEHOLDER_HEIGHT: f32 = 40.0;

const ROW_HEIGHT: f32 = 14.0;
const ENTRY_TOP_PAD: f32 = 6.0;
const ENTRY_BOTTOM_PAD: f32 = 10.0;
const FIXED_ENTRY_ROWS: usize = 3;
const COLUMN_GAP: f32 = 12.0;

/// Tallest entry any policy can produce: fixed rows, location line, every optional row.
pub const MAX_ENTRY_HEIGHT: f32 =
    ENTRY_TOP_PAD + ((FIXED_ENTRY_ROWS + 1 + OptionalField::ALL.len()) as f32) * ROW_HEIGHT + ENTRY_BOTTOM_PAD;

/// Space that must remain before an entry of `entry_height` is placed. The
/// extra group header height keeps a following banner above the bottom margin.
pub fn page_break_threshold(entry_height: f32) -> f32 {
    entry_height + GROUP_HEADER_HEIGHT
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_x: f32,
    /// Baseline of the page-number footer, measured from the bottom edge.
    pub footer_baseline: f32,
}

impl Default for PageGeometry {
    /// US Letter portrait.
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 50.0,
            margin_bottom: 60.0,
            margin_x: 50.0,
            footer_baseline: 30.0,
        }
    }
}

impl PageGeometry {
    pub fn content_top(&self) -> f32 {
        self.height - self.margin_top
    }

    pub fn content_bottom(&self) -> f32 {
        self.margin_bottom
    }

    pub fn content_height(&self) -> f32 {
        self.content_top() - self.content_bottom()
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin_x
    }
}

/// Position of the next writable line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page: usize,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Header,
    GroupHeader,
    Entry,
    Placeholder,
}

/// Record of one placed block, kept for inspection after rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub kind: BlockKind,
    pub page: usize,
    pub top: f32,
    pub bottom: f32,
    pub label: String,
}

/// Pre-formatted strings for the report header.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub title: String,
    pub subtitle: String,
    pub jurisdiction_label: String,
    pub date_range: String,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub operations: Vec<Operation>,
    pub footer: String,
}

impl RenderedPage {
    /// Decoded text of every `Tj` run on the page, in drawing order.
    pub fn text_runs(&self) -> Vec<String> {
        self.operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.iter().map(|&b| b as char).collect()),
                _ => None,
            })
            .collect()
    }
}

/// Finished layout. Produced only by [`LayoutEngine::finalize`].
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub geometry: PageGeometry,
    pub pages: Vec<RenderedPage>,
    pub placements: Vec<Placement>,
}

impl RenderedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.placements.iter().filter(|p| p.kind == kind).count()
    }

    pub fn labels(&self, kind: BlockKind) -> Vec<&str> {
        self.placements
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.label.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }
}

enum EntryRow {
    Pair((&'static str, String), (&'static str, String)),
    Single(&'static str, String),
}

pub struct LayoutEngine {
    geometry: PageGeometry,
    cursor: LayoutCursor,
    pages: Vec<Vec<Operation>>,
    placements: Vec<Placement>,
}

impl LayoutEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            cursor: LayoutCursor { page: 0, y: geometry.content_top() },
            geometry,
            pages: vec![Vec::new()],
            placements: Vec::new(),
        }
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn remaining(&self) -> f32 {
        self.cursor.y - self.geometry.content_bottom()
    }

    /// Title block at the top of page 1.
    pub fn place_header(&mut self, meta: &ReportMeta) {
        self.cursor = LayoutCursor { page: 0, y: self.geometry.content_top() };
        let top = self.cursor.y;
        let center = self.geometry.width / 2.0;
        let max_width = self.geometry.content_width();
        let mut y = top;

        let lines = [
            (Font::Bold, TITLE_SIZE, 26.0, meta.title.as_str()),
            (Font::Regular, SUBTITLE_SIZE, 18.0, meta.subtitle.as_str()),
            (Font::Bold, LABEL_SIZE, 16.0, meta.jurisdiction_label.as_str()),
            (Font::Regular, LABEL_SIZE, 16.0, meta.date_range.as_str()),
            (Font::Regular, SMALL_SIZE, 14.0, meta.generated_at.as_str()),
        ];
        for (font, size, advance, text) in lines {
            let text = truncate_to_width(text, max_width, size, font);
            let x = center - text_width(&text, size, font) / 2.0;
            push_text(self.page_ops(), font, size, x, y - size, &text);
            y -= advance;
        }

        let rule_y = y - 6.0;
        let (left, right) = (self.geometry.margin_x, self.geometry.width - self.geometry.margin_x);
        push_line(self.page_ops(), left, rule_y, right, rule_y, 1.0);

        self.advance(top, HEADER_HEIGHT, BlockKind::Header, meta.title.clone());
    }

    /// Shaded banner naming a group. Never starts a new page.
    pub fn place_group_header(&mut self, title: &str, subtitle: Option<&str>) {
        let top = self.cursor.y;
        let x = self.geometry.margin_x;
        let width = self.geometry.content_width();
        let banner_bottom = top - BANNER_HEIGHT;

        let ops = self.page_ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("rg", vec![real(0.9), real(0.9), real(0.9)]));
        ops.push(Operation::new("re", vec![real(x), real(banner_bottom), real(width), real(BANNER_HEIGHT)]));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));

        let baseline = top - 15.0;
        let title_text = truncate_to_width(title, width * 0.5 - COLUMN_GAP, LABEL_SIZE, Font::Bold);
        push_text(self.page_ops(), Font::Bold, LABEL_SIZE, x + 6.0, baseline, &title_text);

        if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
            let sub = truncate_to_width(subtitle, width * 0.5 - 6.0, SMALL_SIZE, Font::Regular);
            let sub_x = x + width - 6.0 - text_width(&sub, SMALL_SIZE, Font::Regular);
            push_text(self.page_ops(), Font::Regular, SMALL_SIZE, sub_x, baseline, &sub);
        }

        self.advance(top, GROUP_HEADER_HEIGHT, BlockKind::GroupHeader, title.to_string());
    }

    /// One application record. Starts a new page first when less than
    /// [`page_break_threshold`] of this entry remains.
    pub fn place_entry(&mut self, record: &ApplicationRecord, policy: &JurisdictionPolicy, include_location: bool) {
        let rows = entry_rows(record, policy, include_location);
        let height = entry_height(rows.len());
        if self.remaining() < page_break_threshold(height) {
            self.new_page();
        }

        let top = self.cursor.y;
        let x = self.geometry.margin_x;
        let width = self.geometry.content_width();
        let column = (width - COLUMN_GAP) / 2.0;

        let mut row_top = top - ENTRY_TOP_PAD;
        for row in &rows {
            let baseline = row_top - 10.0;
            match row {
                EntryRow::Pair(left, right) => {
                    self.push_field(x, baseline, column, left.0, &left.1);
                    self.push_field(x + column + COLUMN_GAP, baseline, column, right.0, &right.1);
                }
                EntryRow::Single(label, value) => self.push_field(x, baseline, width, label, value),
            }
            row_top -= ROW_HEIGHT;
        }

        let rule_y = top - height + ENTRY_BOTTOM_PAD / 2.0;
        push_line(self.page_ops(), x, rule_y, x + width, rule_y, 0.5);

        self.advance(top, height, BlockKind::Entry, record.chemical_name.clone());
    }

    /// Message block shown instead of groups when there is nothing to report.
    pub fn place_placeholder(&mut self, message: &str) {
        let top = self.cursor.y;
        let text = truncate_to_width(message, self.geometry.content_width(), LABEL_SIZE, Font::Regular);
        let x = self.geometry.width / 2.0 - text_width(&text, LABEL_SIZE, Font::Regular) / 2.0;
        push_text(self.page_ops(), Font::Regular, LABEL_SIZE, x, top - 24.0, &text);
        self.advance(top, PLACEHOLDER_HEIGHT, BlockKind::Placeholder, message.to_string());
    }

    /// Stamps `Page i of n` on every page. Consumes the engine, so the page
    /// count is final.
    pub fn finalize(self) -> RenderedReport {
        let total = self.pages.len();
        let center = self.geometry.width / 2.0;
        let footer_y = self.geometry.footer_baseline;

        let pages = self
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, mut operations)| {
                let footer = footer_text(i + 1, total);
                let x = center - text_width(&footer, SMALL_SIZE, Font::Regular) / 2.0;
                push_text(&mut operations, Font::Regular, SMALL_SIZE, x, footer_y, &footer);
                RenderedPage { operations, footer }
            })
            .collect();

        RenderedReport {
            geometry: self.geometry,
            pages,
            placements: self.placements,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = LayoutCursor {
            page: self.pages.len() - 1,
            y: self.geometry.content_top(),
        };
    }

    fn advance(&mut self, top: f32, height: f32, kind: BlockKind, label: String) {
        let bottom = top - height;
        self.placements.push(Placement {
            kind,
            page: self.cursor.page,
            top,
            bottom,
            label,
        });
        self.cursor.y = bottom;
    }

    fn page_ops(&mut self) -> &mut Vec<Operation> {
        let page = self.cursor.page;
        &mut self.pages[page]
    }

    fn push_field(&mut self, x: f32, baseline: f32, width: f32, label: &str, value: &str) {
        let label = format!("{}:", label);
        let label_width = text_width(&label, BODY_SIZE, Font::Bold) + 4.0;
        let value = truncate_to_width(value, (width - label_width).max(0.0), BODY_SIZE, Font::Regular);
        let ops = self.page_ops();
        push_text(ops, Font::Bold, BODY_SIZE, x, baseline, &label);
        push_text(ops, Font::Regular, BODY_SIZE, x + label_width, baseline, &value);
    }
}

pub fn footer_text(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

pub fn entry_height(rows: usize) -> f32 {
    ENTRY_TOP_PAD + rows as f32 * ROW_HEIGHT + ENTRY_BOTTOM_PAD
}

/// Rows an entry will occupy for this policy.
pub fn entry_row_count(policy: &JurisdictionPolicy, include_location: bool) -> usize {
    FIXED_ENTRY_ROWS + usize::from(include_location) + policy.optional_fields.len()
}

fn entry_rows(record: &ApplicationRecord, policy: &JurisdictionPolicy, include_location: bool) -> Vec<EntryRow> {
    let mut rows = vec![
        EntryRow::Pair(
            ("Date", format_date_time(&record.applied_at)),
            ("Chemical", format_chemical(&record.chemical_name, record.epa_reg_number.as_deref())),
        ),
        EntryRow::Pair(
            ("Amount", format_amount(record.quantity, &record.unit)),
            ("Applicator", format_applicator(&record.applicator)),
        ),
        EntryRow::Pair(
            ("Weather", format_weather(record.weather.as_ref())),
            ("Target Pest", or_not_specified(record.target_pest.as_deref())),
        ),
    ];

    if include_location {
        rows.push(EntryRow::Single("Location", format_location(&record.customer)));
    }

    for field in policy.optional_fields {
        let value = match field {
            OptionalField::Method => or_not_specified(record.method.as_deref()),
            OptionalField::Area => format_area(record.area.as_ref()),
            OptionalField::Reentry => or_not_specified(record.reentry_interval.as_deref()),
            OptionalField::Consent => format_consent(record.customer_consent).to_string(),
        };
        rows.push(EntryRow::Single(field.label(), value));
    }

    rows
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn push_text(ops: &mut Vec<Operation>, font: Font, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![Object::Name(font.resource_name().to_vec()), real(size)]));
    ops.push(Operation::new("Td", vec![real(x), real(y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn push_line(ops: &mut Vec<Operation>, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) {
    ops.push(Operation::new("w", vec![real(width)]));
    ops.push(Operation::new("m", vec![real(x1), real(y1)]));
    ops.push(Operation::new("l", vec![real(x2), real(y2)]));
    ops.push(Operation::new("S", vec![]));
}

/// Approximate Helvetica advance widths, in em.
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' => 0.222,
        ' ' | 'f' | 't' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | '/' => 0.278,
        'r' | '(' | ')' | '-' => 0.333,
        'm' | 'M' => 0.833,
        'w' => 0.722,
        'W' => 0.944,
        '@' => 1.015,
        '%' => 0.889,
        'A'..='Z' => 0.667,
        _ => 0.556,
    }
}

fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let scale = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.06,
    };
    text.chars().map(char_width).sum::<f32>() * size * scale
}

fn truncate_to_width(text: &str, max_width: f32, size: f32, font: Font) -> String {
    if text_width(text, size, font) <= max_width {
        return text.to_string();
    }
    let mut out: String = text.to_string();
    while !out.is_empty() {
        out.pop();
        let candidate = format!("{}...", out.trim_end());
        if text_width(&candidate, size, font) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::group::tests::{applicator, customer, record};
    use crate::report::policy::lookup;
    use chrono::{Duration, TimeZone, Utc};

    fn meta() -> ReportMeta {
        ReportMeta {
            title: "Pesticide Application Report".into(),
            subtitle: "Monthly Pesticide Use Report".into(),
            jurisdiction_label: "Jurisdiction: California (CA)".into(),
            date_range: "Reporting Period: May 1, 2024 - May 31, 2024".into(),
            generated_at: "Generated: Saturday, June 1, 2024, 9:00 AM".into(),
        }
    }

    fn records(n: usize) -> Vec<ApplicationRecord> {
        let c = customer("Acme");
        let a = applicator();
        let start = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();
        (0..n).map(|i| record(&c, &a, start - Duration::hours(i as i64))).collect()
    }

    #[test]
    fn threshold_fits_on_fresh_page() {
        let g = PageGeometry::default();
        assert!(page_break_threshold(MAX_ENTRY_HEIGHT) <= g.content_height());
        assert!(HEADER_HEIGHT + page_break_threshold(MAX_ENTRY_HEIGHT) <= g.content_height());
        for policy in crate::report::policy::JURISDICTIONS {
            assert!(entry_height(entry_row_count(policy, true)) <= MAX_ENTRY_HEIGHT);
        }
    }

    #[test]
    fn header_starts_at_top_margin() {
        let mut engine = LayoutEngine::new(PageGeometry::default());
        engine.place_header(&meta());
        let report = engine.finalize();
        let header = &report.placements[0];
        assert_eq!(header.kind, BlockKind::Header);
        assert_eq!(header.page, 0);
        assert_eq!(header.top, PageGeometry::default().content_top());
        assert_eq!(report.page_count(), 1);
    }

    #[test]
    fn entries_paginate_reactively() {
        let ca = lookup("CA").unwrap();
        // CA entries without a location line: 3 fixed + 3 optional rows = 100pt.
        assert_eq!(entry_height(entry_row_count(ca, false)), 100.0);

        for (n, pages) in [(4, 1), (5, 1), (6, 2), (11, 2), (12, 3)] {
            let mut engine = LayoutEngine::new(PageGeometry::default());
            engine.place_header(&meta());
            engine.place_group_header("Acme", None);
            for r in &records(n) {
                engine.place_entry(r, ca, false);
            }
            assert_eq!(engine.finalize().page_count(), pages, "{} entries", n);
        }
    }

    #[test]
    fn page_count_matches_content_height() {
        let ca = lookup("CA").unwrap();
        let geometry = PageGeometry::default();
        let height = entry_height(entry_row_count(ca, false));

        for n in [1, 3, 5, 6, 8, 11] {
            let mut engine = LayoutEngine::new(geometry);
            engine.place_header(&meta());
            engine.place_group_header("Acme", None);
            for r in &records(n) {
                engine.place_entry(r, ca, false);
            }
            let content = HEADER_HEIGHT + GROUP_HEADER_HEIGHT + n as f32 * height;
            let expected = (content / geometry.content_height()).ceil() as usize;

            let report = engine.finalize();
            assert_eq!(report.page_count(), expected, "{} entries, {}pt", n, content);
            for (i, page) in report.pages.iter().enumerate() {
                assert_eq!(page.footer, format!("Page {} of {}", i + 1, expected));
            }
        }
    }

    #[test]
    fn no_block_crosses_bottom_margin() {
        let tx = lookup("TX").unwrap();
        let geometry = PageGeometry::default();
        let mut engine = LayoutEngine::new(geometry);
        engine.place_header(&meta());
        let rs = records(40);
        for (i, r) in rs.iter().enumerate() {
            if i % 3 == 0 {
                engine.place_group_header("Friday, May 31, 2024", None);
            }
            let before = engine.cursor();
            engine.place_entry(r, tx, true);
            let after = engine.cursor();
            if after.page != before.page {
                let height = entry_height(entry_row_count(tx, true));
                assert!(before.y - geometry.content_bottom() < page_break_threshold(height));
            }
        }
        let report = engine.finalize();
        assert!(report.page_count() > 1);
        for p in &report.placements {
            assert!(p.bottom >= geometry.content_bottom(), "{:?} overflows", p);
            assert!(p.top <= geometry.content_top());
        }
        for p in report.placements.iter().filter(|p| p.kind == BlockKind::Entry) {
            let prev_on_page = report
                .placements
                .iter()
                .any(|q| q.page == p.page && q.bottom >= p.top && !std::ptr::eq(p, q));
            assert!(prev_on_page || p.top == geometry.content_top());
        }
    }

    #[test]
    fn finalize_numbers_every_page() {
        let ca = lookup("CA").unwrap();
        let mut engine = LayoutEngine::new(PageGeometry::default());
        engine.place_header(&meta());
        for r in &records(25) {
            engine.place_entry(r, ca, false);
        }
        let report = engine.finalize();
        let total = report.page_count();
        assert!(total >= 3);
        for (i, page) in report.pages.iter().enumerate() {
            let expected = format!("Page {} of {}", i + 1, total);
            assert_eq!(page.footer, expected);
            assert_eq!(page.text_runs().last(), Some(&expected));
        }
    }

    #[test]
    fn optional_rows_follow_policy() {
        let c = customer("Acme");
        let r = record(&c, &applicator(), Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap());

        let mut engine = LayoutEngine::new(PageGeometry::default());
        engine.place_entry(&r, lookup("TX").unwrap(), true);
        let texts = engine.finalize().pages[0].text_runs();
        assert!(texts.contains(&"Location:".to_string()));
        assert!(texts.contains(&"Customer Consent:".to_string()));
        assert!(!texts.contains(&"Re-entry Interval:".to_string()));

        let mut engine = LayoutEngine::new(PageGeometry::default());
        engine.place_entry(&r, lookup("FL").unwrap(), false);
        let texts = engine.finalize().pages[0].text_runs();
        assert!(!texts.contains(&"Location:".to_string()));
        assert!(!texts.contains(&"Method:".to_string()));
        assert!(texts.contains(&"Re-entry Interval:".to_string()));
    }

    #[test]
    fn long_text_is_truncated_to_width() {
        let long = "Extremely long chemical trade name ".repeat(10);
        let out = truncate_to_width(&long, 120.0, BODY_SIZE, Font::Regular);
        assert!(out.ends_with("..."));
        assert!(text_width(&out, BODY_SIZE, Font::Regular) <= 120.0);
        assert_eq!(truncate_to_width("Short", 120.0, BODY_SIZE, Font::Regular), "Short");
    }
}
