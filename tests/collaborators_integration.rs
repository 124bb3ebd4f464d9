//! Default pipeline wired against wiremock services.

mod support;

use std::time::Duration;

use summarize_core::{
    DoiSource, PipelineError, PipelineSettings, build_default_pipeline, render_json,
    render_readable,
};
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEI_WITH_DOI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <fileDesc>
      <titleStmt><title level="a" type="main">Extracted Title</title></titleStmt>
      <sourceDesc>
        <biblStruct>
          <analytic>
            <author><persName><forename type="first">Grace</forename><surname>Hopper</surname></persName></author>
          </analytic>
          <monogr>
            <title level="j">Extracted Journal</title>
            <imprint><biblScope unit="volume">7</biblScope><date type="published" when="2019-02-01">Feb 2019</date></imprint>
          </monogr>
          <idno type="DOI">10.1000/xyz123</idno>
        </biblStruct>
      </sourceDesc>
    </fileDesc>
    <profileDesc>
      <abstract><div><p>We study compilers.</p></div></abstract>
    </profileDesc>
  </teiHeader>
</TEI>"#;

const TEI_WITHOUT_ABSTRACT: &str = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><teiHeader>
  <fileDesc><titleStmt><title>Only a title</title></titleStmt></fileDesc>
</teiHeader></TEI>"#;

const TEI_PREFIX_ONLY: &str = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><teiHeader>
  <fileDesc>
    <titleStmt><title>Searchable Title</title></titleStmt>
    <sourceDesc><biblStruct><idno type="DOI">10.1000</idno></biblStruct></sourceDesc>
  </fileDesc>
  <profileDesc><abstract><p>Short abstract.</p></abstract></profileDesc>
</teiHeader></TEI>"#;

fn settings_for(server: &MockServer) -> PipelineSettings {
    let uri = server.uri();
    PipelineSettings {
        grobid_url: uri.clone(),
        crossref_url: uri.clone(),
        translate_url: format!("{uri}/translate"),
        summarize_url: format!("{uri}/summarize"),
        call_timeout: Duration::from_secs(10),
        ..PipelineSettings::default()
    }
}

async fn mount_grobid(server: &MockServer, tei: &str) {
    Mock::given(method("POST"))
        .and(path("/api/processFulltextDocument"))
        .respond_with(ResponseTemplate::new(200).set_body_string(tei))
        .mount(server)
        .await;
}

async fn mount_transforms(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(serde_json::json!({
            "parameters": {"src_lang": "eng_Latn", "tgt_lang": "kor_Hang"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"translation_text": "컴파일러를 연구한다."}])),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"summary_text": "컴파일러 연구"}])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_merges_crossref_over_grobid() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_grobid(&server, TEI_WITH_DOI).await;
    mount_transforms(&server).await;
    Mock::given(method("GET"))
        .and(path("/works/10.1000%2Fxyz123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "message": {
                "DOI": "10.1000/xyz123",
                "title": ["Registry Title"],
                "author": [{"given": "Grace M.", "family": "Hopper"}],
                "container-title": [],
                "page": "1-10",
                "published-print": {"date-parts": [[2019, 3]]}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = build_default_pipeline(&settings_for(&server)).unwrap();
    let outcome = pipeline.run(b"%PDF-1.4 fake", "paper.pdf").await.unwrap();
    let record = &outcome.digest.record;

    assert_eq!(outcome.doi_source, Some(DoiSource::Extracted));
    assert_eq!(record.title.as_deref(), Some("Registry Title"));
    assert_eq!(record.authors, vec!["Grace M. Hopper".to_string()]);
    // Empty container-title falls back to the extracted journal.
    assert_eq!(record.journal.as_deref(), Some("Extracted Journal"));
    assert_eq!(record.volume.as_deref(), Some("7"));
    assert_eq!(record.pages.as_deref(), Some("1-10"));
    assert_eq!(record.pub_date.as_deref(), Some("2019-3"));
    assert_eq!(record.abstract_en.as_deref(), Some("We study compilers."));
    assert_eq!(outcome.digest.abstract_translated, "컴파일러를 연구한다.");
    assert_eq!(outcome.digest.summary, "컴파일러 연구");

    let text = render_readable(&outcome.digest);
    assert!(text.contains("https://doi.org/10.1000/xyz123"));
    let json = render_json(&outcome.digest).unwrap();
    assert!(json.contains("\"summary\": \"컴파일러 연구\""));
}

#[tokio::test]
async fn test_prefix_only_doi_recovered_by_crossref_title_search() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_grobid(&server, TEI_PREFIX_ONLY).await;
    mount_transforms(&server).await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("query.title", "Searchable Title"))
        .and(query_param("rows", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "message": {"items": [{"DOI": "10.2000/found"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works/10.2000%2Ffound"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = build_default_pipeline(&settings_for(&server)).unwrap();
    let outcome = pipeline.run(b"not really a pdf", "prefix.pdf").await.unwrap();

    assert_eq!(outcome.doi_source, Some(DoiSource::TitleSearch));
    assert_eq!(outcome.digest.record.doi.as_deref(), Some("10.2000/found"));
    assert_eq!(outcome.digest.record.title.as_deref(), Some("Searchable Title"));
    assert_eq!(outcome.digest.record.abstract_en.as_deref(), Some("Short abstract."));
}

#[tokio::test]
async fn test_translation_failure_leaves_empty_sections() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_grobid(&server, TEI_WITH_DOI).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = build_default_pipeline(&settings_for(&server)).unwrap();
    let outcome = pipeline.run(b"%PDF", "paper.pdf").await.unwrap();

    assert_eq!(outcome.digest.abstract_translated, "");
    assert_eq!(outcome.digest.summary, "");
    assert_eq!(outcome.digest.record.title.as_deref(), Some("Extracted Title"));
}

#[tokio::test]
async fn test_grobid_without_abstract_aborts() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_grobid(&server, TEI_WITHOUT_ABSTRACT).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = build_default_pipeline(&settings_for(&server)).unwrap();
    let err = pipeline.run(b"%PDF", "empty.pdf").await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingAbstract { .. }));
}

#[tokio::test]
async fn test_grobid_outage_aborts() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/api/processFulltextDocument"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let pipeline = build_default_pipeline(&settings_for(&server)).unwrap();
    let err = pipeline.run(b"%PDF", "down.pdf").await.unwrap_err();
    assert!(matches!(err, PipelineError::ExtractionFailed { .. }));
    assert!(err.to_string().contains("down.pdf"));
}
