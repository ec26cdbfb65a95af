use flagdeck::domain::{CountryRecord, RecordFields};
use flagdeck::latex::{DocumentTemplate, escape, render_card};
use flagdeck::records::RecordStore;

fn record(code: &str, fields: RecordFields) -> CountryRecord {
    CountryRecord::from_fields(code.parse().unwrap(), fields)
}

#[test]
fn escape_matches_reference_string() {
    assert_eq!(escape("50% & #1_{x}"), "50\\% \\& \\#1\\_\\{x\\}");
}

#[test]
fn escape_handles_every_control_character() {
    assert_eq!(escape("%&#$_{}"), "\\%\\&\\#\\$\\_\\{\\}");
    assert_eq!(escape("plain text, 中文"), "plain text, 中文");
}

#[test]
fn card_escapes_every_field() {
    let card = render_card(
        &record(
            "US",
            RecordFields {
                name: Some("United_States".into()),
                name_cn: Some("美国".into()),
                capital: Some("Washington, D.C.".into()),
                capital_cn: Some("华盛顿".into()),
                languages: Some("English, Spanish".into()),
                languages_cn: Some("英语".into()),
                fact: Some("50 states & 1 district".into()),
            },
        ),
        "flags/us.png",
    );
    let text = card.as_str();

    assert!(text.starts_with(
        r"\card{\centering\includegraphics[width=0.3\textwidth]{flags/us.png}}{"
    ));
    assert!(text.contains(r"\textbf{United\_States} & \textbf{美国}"));
    assert!(text.contains(
        r"{\raggedright Washington, D.C.\\华盛顿\\English, Spanish\\英语}"
    ));
    assert!(text.contains(r"\textbf{Fact:} 50 states \& 1 district"));
    assert!(text.ends_with("\\end{tabular}\n}"));
}

#[test]
fn card_renders_placeholders() {
    let card = render_card(&record("aq", RecordFields::default()), "flags/aq.png");
    assert!(card.as_str().contains(r"\textbf{N/A} & \textbf{N/A}"));
    assert!(card.as_str().contains("No fact this time :c"));
}

#[test]
fn assemble_wraps_cards_once_in_order() {
    let store = RecordStore::from_reader(
        "iso;country\nNO;Norway\nSE;Sweden\n".as_bytes(),
    )
    .unwrap();
    let a = render_card(store.resolve("no").unwrap(), "flags/no.png");
    let b = render_card(store.resolve("se").unwrap(), "flags/se.png");
    let template = DocumentTemplate::default();

    let forward = template.assemble(&[a.clone(), b.clone()]);
    let backward = template.assemble(&[b, a]);

    assert_ne!(forward, backward);
    for document in [&forward, &backward] {
        assert_eq!(document.matches(r"\begin{document}").count(), 1);
        assert_eq!(document.matches(r"\end{document}").count(), 1);
        assert!(document.starts_with(&template.preamble));
        assert!(document.ends_with(&template.postamble));
    }
    assert!(forward.find("Norway").unwrap() < forward.find("Sweden").unwrap());
}

#[test]
fn assemble_without_cards_is_a_valid_empty_document() {
    let template = DocumentTemplate::default();
    let document = template.assemble(&[]);
    assert_eq!(document, format!("{}{}", template.preamble, template.postamble));
    assert!(document.contains(r"\usepackage{xeCJK}"));
    assert!(document.contains(r"\documentclass[frontgrid, backgrid,a4,12pt]{flacards}"));
}

#[test]
fn template_overrides_come_from_files() {
    let temp = tempfile::tempdir().unwrap();
    let preamble = temp.path().join("preamble.tex");
    std::fs::write(&preamble, "\\begin{document}\n").unwrap();

    let template = DocumentTemplate::with_overrides(Some(&preamble), None).unwrap();
    assert_eq!(template.preamble, "\\begin{document}\n");
    assert_eq!(template.postamble, DocumentTemplate::default().postamble);

    let missing = temp.path().join("missing.tex");
    assert!(DocumentTemplate::with_overrides(None, Some(&missing)).is_err());
}
