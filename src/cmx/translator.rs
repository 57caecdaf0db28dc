//! Translation between CMX record trees and the canonical document model.
//!
//! Both directions are fixed rule tables keyed on the closed tag/kind sets.
//! Geometry passes through the per-file unit scale (the `cont` chunk factor)
//! composed with node-local transforms; colors go through the
//! [`ColorManager`] so the canonical side always holds resolved channel
//! values. Saving degrades what CMX cannot hold (gradients, patterns, spot
//! and non-CMYK colors, text) and records one warning per degraded node.

use smallvec::SmallVec;

use crate::chunk::{Record, RecordTag};
use crate::common::binary::{read_f64_le, read_i32_le, read_pstr, read_u16_le, write_pstr};
use crate::common::color::{Color, ColorManager, Colorspace};
use crate::common::error::{Error, Result};
use crate::geom::{Path, Point, Segment};
use crate::model::{
    Document, DocumentNode, Fill, FormatCaps, Geometry, LayerFlags, NodeKind, Stroke, StrokeSpec,
    Style, StyleTable, Translated, TranslationWarning, degrade_style,
};

use super::config::CmxConfig;
use super::consts;
use super::parser::CmxTree;

/// What CMX stores natively.
pub const CMX_CAPS: FormatCaps = FormatCaps {
    gradients: false,
    patterns: false,
    spot_colors: false,
    colorspaces: &[Colorspace::Cmyk],
};

/// Build a canonical document from a parsed CMX tree.
pub fn to_canonical(
    tree: &CmxTree,
    config: &CmxConfig,
    cm: &dyn ColorManager,
) -> Result<Translated<Document>> {
    let _ = cm; // colors arrive with explicit channels; nothing to resolve
    let factor = tree
        .root
        .find_child(RecordTag::fourcc(&consts::CONT))
        .and_then(|cont| read_f64_le(&cont.payload, 0).ok())
        .filter(|f| *f > 0.0)
        .unwrap_or(config.factor);

    let colors = match tree.root.find_child(RecordTag::fourcc(&consts::RCLR)) {
        Some(rclr) => decode_color_table(&rclr.payload)?,
        None => Vec::new(),
    };

    let mut doc = Document::new();
    doc.pages_mut().children.clear();

    let mut page_index = 0usize;
    for chunk in &tree.root.children {
        if !is_list(chunk, &consts::LIST_PAGE) {
            continue;
        }
        page_index += 1;
        let mut page = DocumentNode::named(NodeKind::Page, &format!("Page {}", page_index));
        for layer_chunk in &chunk.children {
            if !is_list(layer_chunk, &consts::LIST_LAYR) {
                continue;
            }
            page.append(decode_layer(layer_chunk, &colors, factor, &mut doc.styles)?);
        }
        if page.children.is_empty() {
            page.append(DocumentNode::named(NodeKind::Layer, "Layer 1"));
        }
        doc.pages_mut().append(page);
    }
    if doc.pages().children.is_empty() {
        let mut page = DocumentNode::named(NodeKind::Page, "Page 1");
        page.append(DocumentNode::named(NodeKind::Layer, "Layer 1"));
        doc.pages_mut().append(page);
    }

    Ok(Translated::clean(doc))
}

fn is_list(record: &Record, form: &[u8; 4]) -> bool {
    record.tag == RecordTag::fourcc(&consts::LIST) && record.payload == form
}

fn decode_layer(
    chunk: &Record,
    colors: &[Color],
    factor: f64,
    styles: &mut StyleTable,
) -> Result<DocumentNode> {
    let mut layer = DocumentNode::new(NodeKind::Layer);
    for child in &chunk.children {
        match child.tag {
            RecordTag::FourCc(tag) if tag == consts::LINF => {
                if child.payload.is_empty() {
                    return Err(Error::Parse("empty layer info chunk".to_string()));
                }
                layer.flags = LayerFlags::from_bits_truncate(child.payload[0]);
                let (name, _) = read_pstr(&child.payload, 1)?;
                layer.name = name;
            }
            _ => {
                if let Some(node) = decode_object(child, colors, factor, styles)? {
                    layer.append(node);
                }
            }
        }
    }
    if layer.name.is_empty() {
        layer.name = "Layer 1".to_string();
    }
    Ok(layer)
}

fn decode_object(
    chunk: &Record,
    colors: &[Color],
    factor: f64,
    styles: &mut StyleTable,
) -> Result<Option<DocumentNode>> {
    if is_list(chunk, &consts::LIST_GRP) {
        let mut group = DocumentNode::new(NodeKind::Group);
        for child in &chunk.children {
            if let Some(node) = decode_object(child, colors, factor, styles)? {
                group.append(node);
            }
        }
        return Ok(Some(group));
    }

    let tag = match chunk.tag {
        RecordTag::FourCc(tag) => tag,
        RecordTag::Opcode(_) => return Ok(None),
    };
    let kind = match tag {
        t if t == consts::RECT => NodeKind::Rectangle,
        t if t == consts::ELPS => NodeKind::Ellipse,
        t if t == consts::PATH => NodeKind::Curve,
        _ => {
            log::debug!("skipping unknown chunk '{}'", chunk.tag);
            return Ok(None);
        }
    };

    let style_id = styles.publish(decode_style_prefix(&chunk.payload, colors, factor)?);
    let mut node = DocumentNode::new(kind);
    node.style = style_id;
    node.geometry = Some(match kind {
        NodeKind::Rectangle | NodeKind::Ellipse => {
            let x = read_i32_le(&chunk.payload, 8)? as f64 * factor;
            let y = read_i32_le(&chunk.payload, 12)? as f64 * factor;
            let w = read_i32_le(&chunk.payload, 16)? as f64 * factor;
            let h = read_i32_le(&chunk.payload, 20)? as f64 * factor;
            if kind == NodeKind::Rectangle {
                Geometry::Rect { x, y, w, h }
            } else {
                Geometry::Ellipse { x, y, w, h }
            }
        }
        _ => Geometry::Paths(decode_path_points(&chunk.payload, factor)?),
    });
    Ok(Some(node))
}

fn decode_style_prefix(payload: &[u8], colors: &[Color], factor: f64) -> Result<Style> {
    let fill_idx = read_u16_le(payload, 0)?;
    let outline_idx = read_u16_le(payload, 2)?;
    let outline_width = read_i32_le(payload, 4)?;

    let mut style = Style::new("");
    style.fill = match color_at(colors, fill_idx)? {
        Some(color) => Fill::Solid(color),
        None => Fill::None,
    };
    style.stroke = match color_at(colors, outline_idx)? {
        Some(color) => Stroke::Solid(StrokeSpec {
            width: outline_width as f64 * factor,
            color,
            dashes: Vec::new(),
            cap: Default::default(),
            join: Default::default(),
        }),
        None => Stroke::None,
    };
    Ok(style)
}

fn color_at(colors: &[Color], idx: u16) -> Result<Option<Color>> {
    if idx == consts::COLOR_NONE {
        return Ok(None);
    }
    colors
        .get(idx as usize)
        .cloned()
        .map(Some)
        .ok_or_else(|| Error::Parse(format!("color index {} out of table range", idx)))
}

fn decode_color_table(payload: &[u8]) -> Result<Vec<Color>> {
    let count = read_u16_le(payload, 0)? as usize;
    let mut colors = Vec::with_capacity(count);
    for i in 0..count {
        let at = 2 + i * 5;
        if at + 5 > payload.len() {
            return Err(Error::Parse("color table shorter than its count".to_string()));
        }
        let model = payload[at];
        let ch = |j: usize| payload[at + 1 + j] as f64 / 255.0;
        colors.push(match model {
            consts::COLOR_MODEL_CMYK => Color::cmyk(ch(0), ch(1), ch(2), ch(3)),
            consts::COLOR_MODEL_RGB => Color::rgb(ch(0), ch(1), ch(2)),
            consts::COLOR_MODEL_GRAY => Color::gray(ch(0)),
            other => {
                return Err(Error::Parse(format!("unknown color model {}", other)));
            }
        });
    }
    Ok(colors)
}

fn decode_path_points(payload: &[u8], factor: f64) -> Result<Vec<Path>> {
    let count = read_u16_le(payload, 8)? as usize;
    let mut paths = Vec::new();
    let mut current: Option<Path> = None;
    let mut ctrl: SmallVec<[Point; 2]> = SmallVec::new();

    for i in 0..count {
        let at = 10 + i * 9;
        if at + 9 > payload.len() {
            return Err(Error::Parse("path chunk shorter than its point count".to_string()));
        }
        let verb = payload[at];
        let point = Point::new(
            read_i32_le(payload, at + 1)? as f64 * factor,
            read_i32_le(payload, at + 5)? as f64 * factor,
        );
        match verb & consts::VERB_MASK {
            consts::VERB_MOVE => {
                if !ctrl.is_empty() {
                    return Err(Error::Parse("dangling control point".to_string()));
                }
                if let Some(done) = current.take() {
                    paths.push(done);
                }
                let mut path = Path::new(point);
                path.closed = verb & consts::VERB_CLOSED_FLAG != 0;
                current = Some(path);
            }
            consts::VERB_LINE => {
                if !ctrl.is_empty() {
                    return Err(Error::Parse("dangling control point".to_string()));
                }
                match current.as_mut() {
                    Some(path) => {
                        path.line_to(point);
                    }
                    None => {
                        return Err(Error::Parse("path point before subpath start".to_string()));
                    }
                }
            }
            consts::VERB_CONTROL => {
                if ctrl.len() == 2 {
                    return Err(Error::Parse("more than two control points".to_string()));
                }
                ctrl.push(point);
            }
            consts::VERB_CURVE_END => {
                if ctrl.len() != 2 {
                    return Err(Error::Parse("curve end without two control points".to_string()));
                }
                match current.as_mut() {
                    Some(path) => {
                        path.curve_to(ctrl[0], ctrl[1], point);
                    }
                    None => {
                        return Err(Error::Parse("path point before subpath start".to_string()));
                    }
                }
                ctrl.clear();
            }
            other => {
                return Err(Error::Parse(format!("unknown path verb {}", other)));
            }
        }
    }
    if !ctrl.is_empty() {
        return Err(Error::Parse("dangling control point".to_string()));
    }
    if let Some(done) = current.take() {
        paths.push(done);
    }
    Ok(paths)
}

/// Serialize a canonical document into a CMX record tree.
///
/// Never fails: anything CMX cannot hold is degraded and reported through
/// the returned warnings.
pub fn from_canonical(
    doc: &Document,
    config: &CmxConfig,
    cm: &dyn ColorManager,
) -> Translated<CmxTree> {
    let mut warnings = Vec::new();
    let mut table = ColorTableBuilder::new();

    let mut root = Record::new(RecordTag::fourcc(&if config.big_endian {
        consts::ROOT_BE
    } else {
        consts::ROOT_LE
    }));
    root.payload = consts::CMX_FORM.to_vec();
    root.children.push(Record::leaf(
        RecordTag::fourcc(&consts::CONT),
        config.factor.to_le_bytes().to_vec(),
    ));

    let mut pages = Vec::new();
    for page in &doc.pages().children {
        let mut page_list = list_record(&consts::LIST_PAGE);
        for layer in &page.children {
            if layer.kind != NodeKind::Layer {
                continue;
            }
            let mut layer_list = list_record(&consts::LIST_LAYR);
            let mut linf = vec![layer.flags.bits()];
            write_pstr(&mut linf, if layer.name.is_empty() { "Layer 1" } else { &layer.name });
            layer_list
                .children
                .push(Record::leaf(RecordTag::fourcc(&consts::LINF), linf));
            for object in &layer.children {
                encode_object(
                    object,
                    doc,
                    config,
                    cm,
                    &mut table,
                    &mut warnings,
                    &mut layer_list.children,
                );
            }
            page_list.children.push(layer_list);
        }
        pages.push(page_list);
    }

    root.children.push(Record::leaf(
        RecordTag::fourcc(&consts::RCLR),
        table.into_payload(),
    ));
    root.children.extend(pages);

    Translated {
        value: CmxTree {
            root,
            big_endian: config.big_endian,
        },
        warnings,
    }
}

fn list_record(form: &[u8; 4]) -> Record {
    let mut record = Record::new(RecordTag::fourcc(&consts::LIST));
    record.payload = form.to_vec();
    record
}

fn encode_object(
    node: &DocumentNode,
    doc: &Document,
    config: &CmxConfig,
    cm: &dyn ColorManager,
    table: &mut ColorTableBuilder,
    warnings: &mut Vec<TranslationWarning>,
    out: &mut Vec<Record>,
) {
    match node.kind {
        NodeKind::Group => {
            let mut group = list_record(&consts::LIST_GRP);
            for child in &node.children {
                encode_object(child, doc, config, cm, table, warnings, &mut group.children);
            }
            out.push(group);
        }
        NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Curve => {
            let style = degrade_style(
                doc.styles.get(node.style),
                &CMX_CAPS,
                cm,
                config.spot_fallback,
                node.kind,
                warnings,
            );
            let mut payload = encode_style_prefix(&style, table, config.factor);

            let identity = node.trafo == crate::geom::Trafo::IDENTITY;
            match (&node.geometry, identity) {
                (Some(Geometry::Rect { x, y, w, h }), true) => {
                    encode_rect_body(&mut payload, [*x, *y, *w, *h], config.factor);
                    out.push(Record::leaf(RecordTag::fourcc(&consts::RECT), payload));
                }
                (Some(Geometry::Ellipse { x, y, w, h }), true) => {
                    encode_rect_body(&mut payload, [*x, *y, *w, *h], config.factor);
                    out.push(Record::leaf(RecordTag::fourcc(&consts::ELPS), payload));
                }
                _ => {
                    // Transformed primitives and free paths share the path
                    // chunk; to_paths already applies the node trafo.
                    encode_path_body(&mut payload, &node.to_paths(), config.factor);
                    out.push(Record::leaf(RecordTag::fourcc(&consts::PATH), payload));
                }
            }
        }
        NodeKind::TextBlock => {
            warnings.push(TranslationWarning::new(
                node.kind,
                "text block has no CMX representation and was dropped",
            ));
        }
        // Structural kinds never reach object encoding.
        _ => {}
    }
}

fn encode_style_prefix(style: &Style, table: &mut ColorTableBuilder, factor: f64) -> Vec<u8> {
    let fill_idx = match &style.fill {
        Fill::Solid(color) => table.index_of(color),
        _ => consts::COLOR_NONE,
    };
    let (outline_idx, width) = match &style.stroke {
        Stroke::Solid(spec) => (table.index_of(&spec.color), to_raw(spec.width, factor)),
        Stroke::None => (consts::COLOR_NONE, 0),
    };
    let mut payload = Vec::with_capacity(24);
    payload.extend_from_slice(&fill_idx.to_le_bytes());
    payload.extend_from_slice(&outline_idx.to_le_bytes());
    payload.extend_from_slice(&width.to_le_bytes());
    payload
}

fn encode_rect_body(payload: &mut Vec<u8>, rect: [f64; 4], factor: f64) {
    for v in rect {
        payload.extend_from_slice(&to_raw(v, factor).to_le_bytes());
    }
}

fn encode_path_body(payload: &mut Vec<u8>, paths: &[Path], factor: f64) {
    let count: usize = paths
        .iter()
        .map(|p| {
            1 + p
                .segments
                .iter()
                .map(|s| match s {
                    Segment::Line(_) => 1,
                    Segment::Curve { .. } => 3,
                })
                .sum::<usize>()
        })
        .sum();
    payload.extend_from_slice(&(count as u16).to_le_bytes());

    let mut push = |verb: u8, p: Point| {
        payload.push(verb);
        payload.extend_from_slice(&to_raw(p.x, factor).to_le_bytes());
        payload.extend_from_slice(&to_raw(p.y, factor).to_le_bytes());
    };
    for path in paths {
        let move_verb = if path.closed {
            consts::VERB_MOVE | consts::VERB_CLOSED_FLAG
        } else {
            consts::VERB_MOVE
        };
        push(move_verb, path.start);
        for seg in &path.segments {
            match *seg {
                Segment::Line(p) => push(consts::VERB_LINE, p),
                Segment::Curve { c1, c2, end, .. } => {
                    push(consts::VERB_CONTROL, c1);
                    push(consts::VERB_CONTROL, c2);
                    push(consts::VERB_CURVE_END, end);
                }
            }
        }
    }
}

fn to_raw(v: f64, factor: f64) -> i32 {
    (v / factor).round() as i32
}

/// Deduplicating color table accumulator.
struct ColorTableBuilder {
    entries: Vec<[u8; 5]>,
}

impl ColorTableBuilder {
    fn new() -> Self {
        ColorTableBuilder {
            entries: Vec::new(),
        }
    }

    fn index_of(&mut self, color: &Color) -> u16 {
        let entry = encode_color(color);
        if let Some(idx) = self.entries.iter().position(|e| *e == entry) {
            return idx as u16;
        }
        self.entries.push(entry);
        (self.entries.len() - 1) as u16
    }

    fn into_payload(self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(2 + self.entries.len() * 5);
        payload.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        for entry in self.entries {
            payload.extend_from_slice(&entry);
        }
        payload
    }
}

fn encode_color(color: &Color) -> [u8; 5] {
    let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut entry = [0u8; 5];
    match color.space {
        Colorspace::Cmyk => {
            entry[0] = consts::COLOR_MODEL_CMYK;
            for i in 0..4 {
                entry[1 + i] = q(color.channels[i]);
            }
        }
        Colorspace::Gray => {
            entry[0] = consts::COLOR_MODEL_GRAY;
            entry[1] = q(color.channels[0]);
        }
        // Everything else was converted by degrade_style; RGB channels are a
        // safe net for callers bypassing degradation.
        _ => {
            entry[0] = consts::COLOR_MODEL_RGB;
            for i in 0..3 {
                entry[1 + i] = q(color.channels[i]);
            }
        }
    }
    entry
}
