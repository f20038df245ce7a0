//! Synthetic W-4 documents for integration tests.
//!
//! The fixtures mirror the structure of the published form: an XFA-derived
//! field hierarchy (`topmostSubform[0].Page1[0]...`), merged field/widget text
//! fields and checkboxes whose on-states are `1`, `2`, `3` rather than `Yes`.

#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

pub const PREFIX: &str = "topmostSubform[0].Page1[0].";

pub fn full(name: &str) -> String {
    format!("{}{}", PREFIX, name)
}

/// Description of a form to build.
#[derive(Debug, Clone)]
pub struct FormFixture {
    pub text_fields: Vec<String>,
    pub checkboxes: Vec<(String, String)>,
    pub max_len: HashMap<String, i64>,
    pub with_acroform: bool,
}

impl FormFixture {
    /// All fields the built-in profile targets, SSN at `Step1b[0].f1_05[0]`.
    pub fn w4_2026() -> Self {
        let text = [
            "Step1a[0].f1_01[0]",
            "Step1a[0].f1_02[0]",
            "Step1a[0].f1_03[0]",
            "Step1a[0].f1_04[0]",
            "Step1b[0].f1_05[0]",
            "Step3_ReadOrder[0].f1_06[0]",
            "Step3_ReadOrder[0].f1_07[0]",
            "f1_08[0]",
            "f1_09[0]",
            "f1_10[0]",
            "f1_11[0]",
        ];
        let checkboxes = [("c1_1[0]", "1"), ("c1_1[1]", "2"), ("c1_1[2]", "3"), ("c1_2[0]", "1")];

        Self {
            text_fields: text.iter().map(|n| full(n)).collect(),
            checkboxes: checkboxes.iter().map(|(n, s)| (full(n), s.to_string())).collect(),
            max_len: HashMap::new(),
            with_acroform: true,
        }
    }

    pub fn without_text_field(mut self, name: &str) -> Self {
        let name = full(name);
        self.text_fields.retain(|n| *n != name);
        self
    }

    pub fn with_text_field(mut self, name: &str) -> Self {
        self.text_fields.push(full(name));
        self
    }

    pub fn without_checkbox(mut self, name: &str) -> Self {
        let name = full(name);
        self.checkboxes.retain(|(n, _)| *n != name);
        self
    }

    pub fn with_max_len(mut self, name: &str, max_len: i64) -> Self {
        self.max_len.insert(full(name), max_len);
        self
    }

    pub fn without_acroform(mut self) -> Self {
        self.with_acroform = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /Helv 12 Tf 72 760 Td (Employee's Withholding Certificate) Tj ET\n".to_vec(),
        ));

        let mut tree = FieldTree::default();
        let mut annots = Vec::new();
        let mut y = 720;

        for name in &self.text_fields {
            let (parent, partial) = tree.parent_of(&mut doc, name);
            let mut field = dictionary! {
                "FT" => "Tx",
                "T" => Object::string_literal(partial),
                "Type" => "Annot",
                "Subtype" => "Widget",
                "Rect" => rect(72, y, 272, y + 18),
                "P" => page_id,
                "F" => 4i64,
                "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
                "Parent" => parent,
            };
            if let Some(max_len) = self.max_len.get(name) {
                field.set("MaxLen", *max_len);
            }
            let id = doc.add_object(field);
            tree.add_kid(parent, id);
            annots.push(Object::Reference(id));
            y -= 24;
        }

        for (name, on_state) in &self.checkboxes {
            let (parent, partial) = tree.parent_of(&mut doc, name);
            let on = doc.add_object(appearance_stream(b"q 0 g 2 2 6 6 re f Q\n"));
            let off = doc.add_object(appearance_stream(b""));
            let mut normal = Dictionary::new();
            normal.set(on_state.as_bytes().to_vec(), Object::Reference(on));
            normal.set("Off", Object::Reference(off));

            let id = doc.add_object(dictionary! {
                "FT" => "Btn",
                "T" => Object::string_literal(partial),
                "Type" => "Annot",
                "Subtype" => "Widget",
                "Rect" => rect(300, y, 310, y + 10),
                "P" => page_id,
                "F" => 4i64,
                "V" => "Off",
                "AS" => "Off",
                "AP" => dictionary! { "N" => normal },
                "Parent" => parent,
            });
            tree.add_kid(parent, id);
            annots.push(Object::Reference(id));
            y -= 24;
        }

        let roots = tree.finish(&mut doc);

        let resources = dictionary! {
            "Font" => dictionary! { "Helv" => font_id },
        };
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => rect(0, 0, 612, 792),
                "Contents" => content_id,
                "Resources" => resources.clone(),
                "Annots" => annots,
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if self.with_acroform {
            catalog.set(
                "AcroForm",
                dictionary! {
                    "Fields" => roots.into_iter().map(Object::Reference).collect::<Vec<_>>(),
                    "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
                    "DR" => resources,
                },
            );
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

/// Non-terminal field nodes, created on demand from dotted names.
#[derive(Default)]
struct FieldTree {
    ids: HashMap<String, ObjectId>,
    nodes: Vec<(ObjectId, String, Option<ObjectId>)>,
    kids: HashMap<ObjectId, Vec<ObjectId>>,
}

impl FieldTree {
    /// Ensure all ancestors of `name` exist; returns the parent and the partial name.
    fn parent_of(&mut self, doc: &mut Document, name: &str) -> (ObjectId, String) {
        let parts: Vec<&str> = name.split('.').collect();
        let mut parent: Option<ObjectId> = None;
        for depth in 1..parts.len() {
            let path = parts[..depth].join(".");
            let id = match self.ids.get(&path) {
                Some(id) => *id,
                None => {
                    let id = doc.new_object_id();
                    self.ids.insert(path, id);
                    self.nodes.push((id, parts[depth - 1].to_string(), parent));
                    if let Some(p) = parent {
                        self.add_kid(p, id);
                    }
                    id
                },
            };
            parent = Some(id);
        }
        let parent = parent.expect("fixture fields are nested");
        (parent, parts[parts.len() - 1].to_string())
    }

    fn add_kid(&mut self, parent: ObjectId, kid: ObjectId) {
        self.kids.entry(parent).or_default().push(kid);
    }

    /// Write the node dictionaries; returns the root field ids.
    fn finish(self, doc: &mut Document) -> Vec<ObjectId> {
        let mut roots = Vec::new();
        for (id, partial, parent) in self.nodes {
            let kids: Vec<Object> = self
                .kids
                .get(&id)
                .map(|k| k.iter().copied().map(Object::Reference).collect())
                .unwrap_or_default();
            let mut node = dictionary! {
                "T" => Object::string_literal(partial),
                "Kids" => kids,
            };
            match parent {
                Some(parent) => node.set("Parent", parent),
                None => roots.push(id),
            }
            doc.objects.insert(id, Object::Dictionary(node));
        }
        roots
    }
}

fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<Object> {
    vec![x0.into(), y0.into(), x1.into(), y1.into()]
}

fn appearance_stream(content: &[u8]) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => rect(0, 0, 10, 10),
        },
        content.to_vec(),
    )
}

/// Find the dictionary of a field by its partial name.
pub fn field_dict<'a>(doc: &'a Document, partial: &str) -> Option<&'a Dictionary> {
    doc.objects.values().find_map(|obj| match obj {
        Object::Dictionary(dict) => match dict.get(b"T") {
            Ok(Object::String(t, _)) if t.as_slice() == partial.as_bytes() => Some(dict),
            _ => None,
        },
        _ => None,
    })
}

/// Concatenated content of every stream in the document.
pub fn all_stream_text(doc: &Document) -> String {
    let mut text = String::new();
    for obj in doc.objects.values() {
        if let Object::Stream(stream) = obj {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            text.push_str(&String::from_utf8_lossy(&content));
            text.push('\n');
        }
    }
    text
}
