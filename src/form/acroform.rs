//! AcroForm filling over an `lopdf` document.
//!
//! [`AcroForm`] indexes the interactive form of a loaded PDF by fully qualified
//! field name (partial `/T` names joined with `.`), sets text values and checks
//! checkboxes, regenerates widget appearances, and flattens the result into
//! plain page content. See ISO 32000-1:2008, Section 12.7 - Interactive Forms.
//!
//! # Example
//!
//! ```ignore
//! use taxflow_w4::form::{AcroForm, FillableForm};
//!
//! let mut form = AcroForm::load(&std::fs::read("fw4.pdf")?)?;
//! form.set_text("topmostSubform[0].Page1[0].Step1a[0].f1_01[0]", "JANE")?;
//! form.check("topmostSubform[0].Page1[0].c1_1[0]")?;
//! form.flatten()?;
//! let bytes = form.save()?;
//! ```

use super::appearance::{self, DefaultAppearance, TextLayout};
use super::field_flags::{ButtonFieldFlags, TextFieldFlags, WidgetFlags};
use super::{FillableForm, FormHandle};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::HashSet;

/// Maximum field hierarchy depth followed while indexing.
const MAX_FIELD_DEPTH: usize = 32;

/// Kind of a terminal form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text field (/Tx)
    Text,
    /// Checkbox (/Btn without radio or push-button flags)
    Checkbox,
    /// Radio button group
    Radio,
    /// Push button
    PushButton,
    /// List or combo box (/Ch)
    Choice,
    /// Signature (/Sig)
    Signature,
    /// Missing or unrecognized /FT
    Unknown,
}

impl FieldKind {
    fn from_type(ft: Option<&[u8]>, flags: u32) -> Self {
        match ft {
            Some(b"Tx") => FieldKind::Text,
            Some(b"Btn") => {
                let flags = ButtonFieldFlags::from_bits_truncate(flags);
                if flags.contains(ButtonFieldFlags::PUSHBUTTON) {
                    FieldKind::PushButton
                } else if flags.contains(ButtonFieldFlags::RADIO) {
                    FieldKind::Radio
                } else {
                    FieldKind::Checkbox
                }
            },
            Some(b"Ch") => FieldKind::Choice,
            Some(b"Sig") => FieldKind::Signature,
            _ => FieldKind::Unknown,
        }
    }

    /// Lower-case name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::PushButton => "push button",
            FieldKind::Choice => "choice",
            FieldKind::Signature => "signature",
            FieldKind::Unknown => "unknown",
        }
    }
}

/// Attributes a field inherits from its ancestors.
#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<Vec<u8>>,
    flags: Option<u32>,
    default_appearance: Option<String>,
    quadding: Option<i64>,
    max_len: Option<usize>,
}

/// Indexed terminal field.
#[derive(Debug, Clone)]
struct FieldEntry {
    id: ObjectId,
    kind: FieldKind,
    flags: u32,
    widgets: Vec<ObjectId>,
    default_appearance: Option<String>,
    quadding: Option<i64>,
    max_len: Option<usize>,
}

/// A widget appearance to draw into page content when flattening.
#[derive(Debug, Clone)]
struct FlattenedWidget {
    /// Form XObject holding the appearance
    xobject: ObjectId,
    /// BBox of the appearance XObject
    bbox: [f32; 4],
    /// Rect of the widget on the page
    rect: [f32; 4],
    /// Optional transformation matrix from the appearance
    matrix: Option<[f32; 6]>,
}

/// Interactive form of a loaded PDF document.
pub struct AcroForm {
    doc: Document,
    fields: IndexMap<String, FieldEntry>,
    default_appearance: Option<String>,
    default_quadding: i64,
    default_fonts: Option<Object>,
}

impl std::fmt::Debug for AcroForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcroForm")
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

impl AcroForm {
    /// Parse PDF bytes and index the form.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Self::from_document(doc)
    }

    /// Index the form of an already parsed document.
    pub fn from_document(doc: Document) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let acroform = acroform_dict(&doc)?.ok_or(Error::NoAcroForm)?;
        let roots: Vec<ObjectId> = match acroform.get(b"Fields").map(|o| resolve(&doc, o)) {
            Ok(Object::Array(refs)) => refs.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => return Err(Error::NoAcroForm),
        };

        let default_appearance = acroform.get(b"DA").ok().and_then(text_of);
        let default_quadding = acroform
            .get(b"Q")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let default_fonts = match acroform.get(b"DR").map(|o| resolve(&doc, o)) {
            Ok(Object::Dictionary(dr)) => dr.get(b"Font").ok().cloned(),
            _ => None,
        };

        let mut fields = IndexMap::new();
        let mut visited = HashSet::new();
        for root in roots {
            index_field(&doc, root, None, &Inherited::default(), 0, &mut visited, &mut fields);
        }
        log::debug!("Indexed {} form fields", fields.len());

        Ok(Self {
            doc,
            fields,
            default_appearance,
            default_quadding,
            default_fonts,
        })
    }

    /// Fully qualified names of all terminal fields, in document order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Kind of the named field.
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).map(|f| f.kind)
    }

    /// Current text value of a text field.
    pub fn text_value(&self, name: &str) -> Option<String> {
        let entry = self.fields.get(name).filter(|f| f.kind == FieldKind::Text)?;
        let dict = self.doc.get_dictionary(entry.id).ok()?;
        dict.get(b"V").ok().and_then(text_of)
    }

    /// Whether a checkbox is currently on.
    pub fn is_checked(&self, name: &str) -> bool {
        let Some(entry) = self.fields.get(name).filter(|f| f.kind == FieldKind::Checkbox) else {
            return false;
        };
        match self.doc.get_dictionary(entry.id).and_then(|d| d.get(b"V")) {
            Ok(Object::Name(state)) => state.as_slice() != b"Off",
            _ => false,
        }
    }

    /// Access the underlying document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Draw every visible widget appearance into its page and remove the form.
    ///
    /// Widgets without a normal appearance are dropped. Other annotation types
    /// are preserved.
    pub fn flatten(&mut self) -> Result<()> {
        let pages: Vec<ObjectId> = self.doc.get_pages().into_values().collect();
        let mut counter = 0usize;
        let mut flattened = 0usize;

        for page_id in pages {
            let annots = match self.doc.get_dictionary(page_id)?.get(b"Annots") {
                Ok(obj) => resolve(&self.doc, obj).clone(),
                Err(_) => continue,
            };
            let Object::Array(annots) = annots else {
                continue;
            };

            let mut kept = Vec::with_capacity(annots.len());
            let mut widgets = Vec::new();
            for annot in annots {
                let Some(annot_id) = annot.as_reference().ok() else {
                    kept.push(annot);
                    continue;
                };
                let Ok(dict) = self.doc.get_dictionary(annot_id) else {
                    kept.push(annot);
                    continue;
                };
                if !matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == b"Widget")
                {
                    kept.push(annot);
                    continue;
                }
                if let Some(widget) = self.widget_appearance(annot_id)? {
                    widgets.push(widget);
                }
            }

            if !widgets.is_empty() {
                let names: Vec<String> = widgets
                    .iter()
                    .map(|_| {
                        counter += 1;
                        format!("FlatField{}", counter)
                    })
                    .collect();
                self.register_xobjects(page_id, &widgets, &names)?;
                let overlay = flatten_overlay(&widgets, &names);
                self.append_page_content(page_id, overlay)?;
                flattened += widgets.len();
            }

            let page = self.doc.get_dictionary_mut(page_id)?;
            if kept.is_empty() {
                page.remove(b"Annots");
            } else {
                page.set("Annots", Object::Array(kept));
            }
        }

        let root_id = self.doc.trailer.get(b"Root")?.as_reference()?;
        self.doc.get_dictionary_mut(root_id)?.remove(b"AcroForm");
        self.doc.prune_objects();
        self.fields.clear();
        log::debug!("Flattened {} widget appearances", flattened);
        Ok(())
    }

    /// Serialize the document.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    fn entry(&self, name: &str, expected: FieldKind) -> Result<&FieldEntry> {
        let entry = self
            .fields
            .get(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;
        if entry.kind != expected {
            return Err(Error::FieldTypeMismatch {
                field: name.to_string(),
                expected: expected.as_str().to_string(),
                found: entry.kind.as_str().to_string(),
            });
        }
        Ok(entry)
    }

    /// Build the appearance resources for a font named in /DA.
    fn font_resources(&self, font: &str) -> Dictionary {
        let from_dr = match self.default_fonts.as_ref().map(|o| resolve(&self.doc, o)) {
            Some(Object::Dictionary(fonts)) => fonts.get(font.as_bytes()).ok().cloned(),
            _ => None,
        };
        let font_obj = from_dr.unwrap_or_else(|| {
            let mut helvetica = Dictionary::new();
            helvetica.set("Type", Object::Name(b"Font".to_vec()));
            helvetica.set("Subtype", Object::Name(b"Type1".to_vec()));
            helvetica.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
            helvetica.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            Object::Dictionary(helvetica)
        });

        let mut fonts = Dictionary::new();
        fonts.set(font.as_bytes().to_vec(), font_obj);
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        resources
    }

    fn widget_rect(&self, widget: ObjectId) -> Result<[f32; 4]> {
        let dict = self.doc.get_dictionary(widget)?;
        Ok(dict
            .get(b"Rect")
            .ok()
            .and_then(|o| numbers::<4>(resolve(&self.doc, o)))
            .map(normalize_rect)
            .unwrap_or([0.0; 4]))
    }

    /// Normal appearance dictionary or stream of a widget, resolved.
    fn normal_appearance(&self, widget: ObjectId) -> Option<&Object> {
        let dict = self.doc.get_dictionary(widget).ok()?;
        let ap = resolve(&self.doc, dict.get(b"AP").ok()?);
        let n = ap.as_dict().ok()?.get(b"N").ok()?;
        Some(n)
    }

    /// Names of the non-Off appearance states of a checkbox widget.
    fn on_state(&self, widget: ObjectId) -> Option<Vec<u8>> {
        let n = self.normal_appearance(widget)?;
        let states = resolve(&self.doc, n).as_dict().ok()?;
        states
            .iter()
            .map(|(k, _)| k)
            .find(|k| k.as_slice() != b"Off")
            .cloned()
    }

    fn widget_appearance(&mut self, widget: ObjectId) -> Result<Option<FlattenedWidget>> {
        let dict = self.doc.get_dictionary(widget)?;
        let flags = dict
            .get(b"F")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        if WidgetFlags::from_bits_truncate(flags as u32).is_invisible() {
            return Ok(None);
        }
        let state = match dict.get(b"AS") {
            Ok(Object::Name(s)) => Some(s.clone()),
            _ => None,
        };

        let Some(normal) = self.normal_appearance(widget) else {
            return Ok(None);
        };
        // /N is either the appearance stream or a dictionary of states
        let stream_id = match normal {
            Object::Reference(id) => match self.doc.get_object(*id) {
                Ok(Object::Stream(_)) => Some(*id),
                Ok(Object::Dictionary(states)) => state
                    .as_deref()
                    .and_then(|s| states.get(s).ok())
                    .and_then(|o| o.as_reference().ok()),
                _ => None,
            },
            Object::Dictionary(states) => state
                .as_deref()
                .and_then(|s| states.get(s).ok())
                .and_then(|o| o.as_reference().ok()),
            _ => None,
        };
        let Some(stream_id) = stream_id else {
            return Ok(None);
        };

        let rect = self.widget_rect(widget)?;
        let Ok(Object::Stream(stream)) = self.doc.get_object_mut(stream_id) else {
            return Ok(None);
        };
        let bbox = stream
            .dict
            .get(b"BBox")
            .ok()
            .and_then(numbers::<4>)
            .unwrap_or([0.0, 0.0, rect[2] - rect[0], rect[3] - rect[1]]);
        let matrix = stream.dict.get(b"Matrix").ok().and_then(numbers::<6>);
        stream.dict.set("Type", Object::Name(b"XObject".to_vec()));
        stream.dict.set("Subtype", Object::Name(b"Form".to_vec()));

        Ok(Some(FlattenedWidget {
            xobject: stream_id,
            bbox,
            rect,
            matrix,
        }))
    }

    /// Add the flattened appearances to the page's /XObject resources.
    fn register_xobjects(
        &mut self,
        page_id: ObjectId,
        widgets: &[FlattenedWidget],
        names: &[String],
    ) -> Result<()> {
        let current = self.doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
        let resources_id = match current {
            Some(Object::Reference(id)) => id,
            Some(Object::Dictionary(inline)) => {
                let id = self.doc.add_object(Object::Dictionary(inline));
                self.doc
                    .get_dictionary_mut(page_id)?
                    .set("Resources", Object::Reference(id));
                id
            },
            _ => {
                let inherited = inherited_resources(&self.doc, page_id).unwrap_or_else(Dictionary::new);
                let id = self.doc.add_object(Object::Dictionary(inherited));
                self.doc
                    .get_dictionary_mut(page_id)?
                    .set("Resources", Object::Reference(id));
                id
            },
        };

        let xobjects_ref = match self.doc.get_dictionary(resources_id)?.get(b"XObject") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        let xobjects = match xobjects_ref {
            Some(id) => self.doc.get_dictionary_mut(id)?,
            None => {
                let resources = self.doc.get_dictionary_mut(resources_id)?;
                if !matches!(resources.get(b"XObject"), Ok(Object::Dictionary(_))) {
                    resources.set("XObject", Object::Dictionary(Dictionary::new()));
                }
                resources.get_mut(b"XObject")?.as_dict_mut()?
            },
        };
        for (widget, name) in widgets.iter().zip(names) {
            xobjects.set(name.as_bytes().to_vec(), Object::Reference(widget.xobject));
        }
        Ok(())
    }

    /// Wrap the existing page content in q/Q and append `overlay` after it.
    fn append_page_content(&mut self, page_id: ObjectId, overlay: Vec<u8>) -> Result<()> {
        let existing: Vec<Object> = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        let save = self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut restore_and_draw = b"Q\n".to_vec();
        restore_and_draw.extend_from_slice(&overlay);
        let draw = self.doc.add_object(Stream::new(Dictionary::new(), restore_and_draw));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save));
        contents.extend(existing);
        contents.push(Object::Reference(draw));
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }
}

impl FormHandle for AcroForm {
    fn has_readable_text_field(&self, identifier: &str) -> bool {
        let Some(entry) = self.fields.get(identifier) else {
            return false;
        };
        if entry.kind != FieldKind::Text {
            return false;
        }
        match self.doc.get_dictionary(entry.id).map(|d| d.get(b"V")) {
            Ok(Err(_)) => true,
            Ok(Ok(value)) => matches!(resolve(&self.doc, value), Object::String(..) | Object::Null),
            Err(_) => false,
        }
    }
}

impl FillableForm for AcroForm {
    fn set_text(&mut self, identifier: &str, value: &str) -> Result<()> {
        let entry = self.entry(identifier, FieldKind::Text)?.clone();
        let length = value.chars().count();
        if let Some(max) = entry.max_len {
            if length > max {
                return Err(Error::ValueTooLong {
                    field: identifier.to_string(),
                    max,
                    actual: length,
                });
            }
        }

        let flags = TextFieldFlags::from_bits_truncate(entry.flags);
        let da = DefaultAppearance::parse(
            entry
                .default_appearance
                .as_deref()
                .or(self.default_appearance.as_deref())
                .unwrap_or("/Helv 0 Tf 0 g"),
        );
        let resources = self.font_resources(&da.font);

        let mut appearances = Vec::with_capacity(entry.widgets.len());
        for &widget in &entry.widgets {
            let rect = self.widget_rect(widget)?;
            let layout = TextLayout {
                width: rect[2] - rect[0],
                height: rect[3] - rect[1],
                quadding: entry.quadding.unwrap_or(self.default_quadding),
                comb: entry
                    .max_len
                    .filter(|_| flags.contains(TextFieldFlags::COMB)),
                password: flags.contains(TextFieldFlags::PASSWORD),
                multiline: flags.contains(TextFieldFlags::MULTILINE),
            };
            let content = appearance::text_field_appearance(&layout, value, &da);
            appearances.push((widget, form_xobject(layout.width, layout.height, &resources, content)));
        }

        self.doc
            .get_dictionary_mut(entry.id)?
            .set("V", encode_text_string(value));
        for (widget, stream) in appearances {
            let stream_id = self.doc.add_object(stream);
            let mut ap = Dictionary::new();
            ap.set("N", Object::Reference(stream_id));
            self.doc
                .get_dictionary_mut(widget)?
                .set("AP", Object::Dictionary(ap));
        }
        Ok(())
    }

    fn check(&mut self, identifier: &str) -> Result<()> {
        let entry = self.entry(identifier, FieldKind::Checkbox)?.clone();

        let mut states = Vec::with_capacity(entry.widgets.len());
        for &widget in &entry.widgets {
            states.push((widget, self.on_state(widget)));
        }
        let field_on = states
            .iter()
            .find_map(|(_, s)| s.clone())
            .unwrap_or_else(|| b"Yes".to_vec());

        for (widget, state) in states {
            let state = match state {
                Some(state) => state,
                None => {
                    // No on-appearance to select; give the widget one
                    let rect = self.widget_rect(widget)?;
                    let (w, h) = (rect[2] - rect[0], rect[3] - rect[1]);
                    let on = self.doc.add_object(form_xobject(
                        w,
                        h,
                        &Dictionary::new(),
                        appearance::checkbox_on_appearance(w, h),
                    ));
                    let off = self
                        .doc
                        .add_object(form_xobject(w, h, &Dictionary::new(), Vec::new()));
                    let mut n = Dictionary::new();
                    n.set(field_on.clone(), Object::Reference(on));
                    n.set("Off", Object::Reference(off));
                    let mut ap = Dictionary::new();
                    ap.set("N", Object::Dictionary(n));
                    self.doc
                        .get_dictionary_mut(widget)?
                        .set("AP", Object::Dictionary(ap));
                    field_on.clone()
                },
            };
            self.doc
                .get_dictionary_mut(widget)?
                .set("AS", Object::Name(state));
        }

        self.doc
            .get_dictionary_mut(entry.id)?
            .set("V", Object::Name(field_on));
        Ok(())
    }
}

/// Recursively index a field and its descendants.
fn index_field(
    doc: &Document,
    id: ObjectId,
    parent_name: Option<&str>,
    parent: &Inherited,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    out: &mut IndexMap<String, FieldEntry>,
) {
    if depth > MAX_FIELD_DEPTH || !visited.insert(id) {
        log::warn!("Skipping field {:?}: cycle or hierarchy too deep", id);
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial = dict.get(b"T").ok().and_then(text_of);
    let name = match (parent_name, partial) {
        (Some(parent), Some(partial)) => format!("{}.{}", parent, partial),
        (None, Some(partial)) => partial,
        (Some(parent), None) => parent.to_string(),
        (None, None) => return,
    };

    let inherited = Inherited {
        field_type: match dict.get(b"FT") {
            Ok(Object::Name(ft)) => Some(ft.clone()),
            _ => parent.field_type.clone(),
        },
        flags: dict
            .get(b"Ff")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .map(|f| f as u32)
            .or(parent.flags),
        default_appearance: dict
            .get(b"DA")
            .ok()
            .and_then(text_of)
            .or_else(|| parent.default_appearance.clone()),
        quadding: dict.get(b"Q").ok().and_then(|o| o.as_i64().ok()).or(parent.quadding),
        max_len: dict
            .get(b"MaxLen")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .and_then(|n| usize::try_from(n).ok())
            .or(parent.max_len),
    };

    let kids: Vec<ObjectId> = match dict.get(b"Kids").map(|o| resolve(doc, o)) {
        Ok(Object::Array(kids)) => kids.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => Vec::new(),
    };
    let (child_fields, widget_kids): (Vec<ObjectId>, Vec<ObjectId>) = kids
        .into_iter()
        .partition(|kid| doc.get_dictionary(*kid).is_ok_and(|d| d.has(b"T")));

    if !child_fields.is_empty() {
        for kid in child_fields {
            index_field(doc, kid, Some(&name), &inherited, depth + 1, visited, out);
        }
        return;
    }

    let widgets = if widget_kids.is_empty() {
        vec![id]
    } else {
        widget_kids
    };
    let flags = inherited.flags.unwrap_or(0);
    out.insert(
        name,
        FieldEntry {
            id,
            kind: FieldKind::from_type(inherited.field_type.as_deref(), flags),
            flags,
            widgets,
            default_appearance: inherited.default_appearance,
            quadding: inherited.quadding,
            max_len: inherited.max_len,
        },
    );
}

fn acroform_dict(doc: &Document) -> Result<Option<&Dictionary>> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(root_id)?;
    Ok(match catalog.get(b"AcroForm").map(|o| resolve(doc, o)) {
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    })
}

/// Follow an indirect reference; direct objects are returned as-is.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Resources inherited from the page tree, if the page has none of its own.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_FIELD_DEPTH {
        if let Ok(resources) = current.get(b"Resources") {
            return resolve(doc, resources).as_dict().ok().cloned();
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise PDFDocEncoding
/// (treated as Latin-1, which it matches for printable characters).
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn text_of(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Encode a field value as a PDF text string.
fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn numbers<const N: usize>(obj: &Object) -> Option<[f32; N]> {
    let items = obj.as_array().ok()?;
    if items.len() < N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_float().ok()?;
    }
    Some(out)
}

fn normalize_rect(r: [f32; 4]) -> [f32; 4] {
    [r[0].min(r[2]), r[1].min(r[3]), r[0].max(r[2]), r[1].max(r[3])]
}

fn form_xobject(width: f32, height: f32, resources: &Dictionary, content: Vec<u8>) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Form".to_vec()));
    dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width.max(0.0)),
            Object::Real(height.max(0.0)),
        ]),
    );
    dict.set("Resources", Object::Dictionary(resources.clone()));
    Stream::new(dict, content)
}

/// Generate content that invokes each appearance XObject at its widget rect.
///
/// The XObject keeps its own /Matrix, which `Do` applies. The BBox is mapped
/// through that matrix first and the resulting box is fitted to the Rect.
fn flatten_overlay(widgets: &[FlattenedWidget], names: &[String]) -> Vec<u8> {
    let mut content = Vec::new();

    for (widget, name) in widgets.iter().zip(names) {
        content.extend_from_slice(b"q\n");

        let bbox = match widget.matrix {
            Some(m) => transform_bbox(widget.bbox, m),
            None => widget.bbox,
        };
        let rect = widget.rect;
        let bbox_width = bbox[2] - bbox[0];
        let bbox_height = bbox[3] - bbox[1];
        let sx = if bbox_width != 0.0 {
            (rect[2] - rect[0]) / bbox_width
        } else {
            1.0
        };
        let sy = if bbox_height != 0.0 {
            (rect[3] - rect[1]) / bbox_height
        } else {
            1.0
        };
        let tx = rect[0] - bbox[0] * sx;
        let ty = rect[1] - bbox[1] * sy;
        content.extend_from_slice(
            format!("{:.6} 0 0 {:.6} {:.6} {:.6} cm\n", sx, sy, tx, ty).as_bytes(),
        );

        content.extend_from_slice(format!("/{} Do\n", name).as_bytes());
        content.extend_from_slice(b"Q\n");
    }

    content
}

/// Axis-aligned bounds of `bbox` after applying matrix `m`.
fn transform_bbox(bbox: [f32; 4], m: [f32; 6]) -> [f32; 4] {
    let corners = [
        (bbox[0], bbox[1]),
        (bbox[2], bbox[1]),
        (bbox[0], bbox[3]),
        (bbox[2], bbox[3]),
    ];
    let mut out = [f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY];
    for (x, y) in corners {
        let tx = m[0] * x + m[2] * y + m[4];
        let ty = m[1] * x + m[3] * y + m[5];
        out[0] = out[0].min(tx);
        out[1] = out[1].min(ty);
        out[2] = out[2].max(tx);
        out[3] = out[3].max(ty);
    }
    out
}
