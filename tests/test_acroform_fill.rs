//! Integration tests for filling and flattening AcroForms.

mod common;

use common::{all_stream_text, field_dict, full, FormFixture};
use lopdf::Document;
use taxflow_w4::form::{AcroForm, FieldKind, FillableForm, FormHandle};
use taxflow_w4::Error;

fn load_fixture(fixture: &FormFixture) -> AcroForm {
    AcroForm::load(&fixture.build()).unwrap()
}

#[test]
fn test_indexes_hierarchical_names() {
    let form = load_fixture(&FormFixture::w4_2026());
    let names: Vec<&str> = form.field_names().collect();

    assert_eq!(names.len(), 15);
    assert!(names.contains(&full("Step1a[0].f1_01[0]").as_str()));
    assert!(names.contains(&full("Step3_ReadOrder[0].f1_07[0]").as_str()));
    assert_eq!(form.field_kind(&full("f1_11[0]")), Some(FieldKind::Text));
    assert_eq!(form.field_kind(&full("c1_1[2]")), Some(FieldKind::Checkbox));
    assert_eq!(form.field_kind("topmostSubform[0].Page1[0]"), None);
}

#[test]
fn test_readable_text_field() {
    let form = load_fixture(&FormFixture::w4_2026());

    assert!(form.has_readable_text_field(&full("Step1b[0].f1_05[0]")));
    assert!(!form.has_readable_text_field(&full("Step1a[0].f1_05[0]")));
    // Checkboxes are not text fields
    assert!(!form.has_readable_text_field(&full("c1_2[0]")));
}

#[test]
fn test_fill_and_reload() {
    let mut form = load_fixture(&FormFixture::w4_2026());
    form.set_text(&full("Step1a[0].f1_01[0]"), "JANE").unwrap();
    form.set_text(&full("Step1a[0].f1_04[0]"), "SPRINGFIELD, IL 62704").unwrap();
    form.check(&full("c1_1[1]")).unwrap();
    let bytes = form.save().unwrap();

    let reloaded = AcroForm::load(&bytes).unwrap();
    assert_eq!(reloaded.text_value(&full("Step1a[0].f1_01[0]")).as_deref(), Some("JANE"));
    assert_eq!(
        reloaded.text_value(&full("Step1a[0].f1_04[0]")).as_deref(),
        Some("SPRINGFIELD, IL 62704")
    );
    assert!(reloaded.is_checked(&full("c1_1[1]")));
    assert!(!reloaded.is_checked(&full("c1_1[0]")));
    assert_eq!(reloaded.text_value(&full("f1_08[0]")), None);
}

#[test]
fn test_check_selects_widget_on_state() {
    let mut form = load_fixture(&FormFixture::w4_2026());
    form.check(&full("c1_1[1]")).unwrap();

    let dict = field_dict(form.document(), "c1_1[1]").unwrap();
    assert_eq!(dict.get(b"V").unwrap().as_name().unwrap(), b"2");
    assert_eq!(dict.get(b"AS").unwrap().as_name().unwrap(), b"2");
}

#[test]
fn test_non_ascii_value_round_trips() {
    let mut form = load_fixture(&FormFixture::w4_2026());
    form.set_text(&full("Step1a[0].f1_02[0]"), "NÚÑEZ").unwrap();
    let bytes = form.save().unwrap();

    let reloaded = AcroForm::load(&bytes).unwrap();
    assert_eq!(reloaded.text_value(&full("Step1a[0].f1_02[0]")).as_deref(), Some("NÚÑEZ"));
}

#[test]
fn test_set_text_errors() {
    let fixture = FormFixture::w4_2026().with_max_len("Step1b[0].f1_05[0]", 11);
    let mut form = load_fixture(&fixture);

    match form.set_text(&full("Step1b[0].f1_04[0]"), "X") {
        Err(Error::FieldNotFound(name)) => assert_eq!(name, full("Step1b[0].f1_04[0]")),
        other => panic!("expected FieldNotFound, got {:?}", other),
    }

    match form.set_text(&full("c1_2[0]"), "X") {
        Err(Error::FieldTypeMismatch { expected, found, .. }) => {
            assert_eq!(expected, "text");
            assert_eq!(found, "checkbox");
        },
        other => panic!("expected FieldTypeMismatch, got {:?}", other),
    }

    match form.set_text(&full("Step1b[0].f1_05[0]"), "123-45-67890") {
        Err(Error::ValueTooLong { max, actual, .. }) => {
            assert_eq!(max, 11);
            assert_eq!(actual, 12);
        },
        other => panic!("expected ValueTooLong, got {:?}", other),
    }
    assert!(form.set_text(&full("Step1b[0].f1_05[0]"), "123-45-6789").is_ok());

    assert!(matches!(form.check(&full("f1_09[0]")), Err(Error::FieldTypeMismatch { .. })));
}

#[test]
fn test_flatten_draws_values_and_removes_form() {
    let mut form = load_fixture(&FormFixture::w4_2026());
    form.set_text(&full("Step1a[0].f1_01[0]"), "JANE").unwrap();
    form.check(&full("c1_2[0]")).unwrap();
    form.flatten().unwrap();
    let bytes = form.save().unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    assert!(!doc.get_dictionary(root).unwrap().has(b"AcroForm"));

    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    assert!(!page.has(b"Annots"));

    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).to_string();
    assert!(content.contains("Employee's Withholding Certificate"));
    assert!(content.contains("/FlatField1 Do"));

    let streams = all_stream_text(&doc);
    assert!(streams.contains("(JANE) Tj"));
    assert!(streams.contains("2 2 6 6 re f"));

    assert!(matches!(AcroForm::load(&bytes), Err(Error::NoAcroForm)));
}

#[test]
fn test_flatten_unchecked_box_draws_off_state() {
    let mut form = load_fixture(&FormFixture::w4_2026());
    form.flatten().unwrap();
    let bytes = form.save().unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let streams = all_stream_text(&doc);
    assert!(!streams.contains("2 2 6 6 re f"));
}

#[test]
fn test_document_without_form() {
    let bytes = FormFixture::w4_2026().without_acroform().build();
    assert!(matches!(AcroForm::load(&bytes), Err(Error::NoAcroForm)));
}

#[test]
fn test_garbage_is_pdf_error() {
    assert!(matches!(AcroForm::load(b"not a pdf"), Err(Error::Pdf(_))));
}
