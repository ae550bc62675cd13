use proposal_scoring::comparison::{
    ComparisonService, ExtractedValue, IndicatorRegistry, ProposalDocument,
    ProposalIndicatorMap, WeightConfig, DEFAULT_MATCH_THRESHOLD,
};

fn service() -> ComparisonService {
    ComparisonService::new(IndicatorRegistry::standard(), DEFAULT_MATCH_THRESHOLD)
        .expect("standard registry compiles")
}

fn documents() -> Vec<ProposalDocument> {
    [
        ("A", include_str!("fixtures/proposal_a.txt")),
        ("B", include_str!("fixtures/proposal_b.txt")),
        ("C", include_str!("fixtures/proposal_c.txt")),
    ]
    .into_iter()
    .map(|(id, text)| ProposalDocument {
        proposal_id: id.to_string(),
        text: text.to_string(),
    })
    .collect()
}

fn selection(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn compare_documents_end_to_end() {
    let indicators = selection(&["built_area", "green_area", "investment_cost"]);
    let report = service()
        .compare(&documents(), Some(&indicators), &WeightConfig::default())
        .expect("compare");

    let ranking: Vec<&str> = report
        .ranking
        .iter()
        .map(|entry| entry.proposal_id.as_str())
        .collect();
    assert_eq!(ranking, vec!["B", "A", "C"]);
    assert_eq!(report.ranking[0].score, Some(100.0));
    assert_eq!(report.ranking[2].score, None);

    assert_eq!(report.board.best_in_class("built_area"), vec!["B"]);
    assert_eq!(report.board.best_in_class("green_area"), vec!["B"]);

    let c = report.board.aggregate("C").expect("aggregate");
    assert_eq!(c.indicators_used, 0);
    assert_eq!(c.indicators_missing, 3);
}

#[test]
fn category_weights_shift_the_ranking() {
    let indicators = selection(&["built_area", "green_area", "dwellings"]);
    let service = service();

    let neutral = service
        .compare(&documents()[..2], Some(&indicators), &WeightConfig::default())
        .expect("compare");
    // B wins land use, A wins dwellings.
    assert_eq!(neutral.ranking[0].proposal_id, "B");

    let buildings_first = WeightConfig::default()
        .with_category("land_use", 10.0)
        .with_category("buildings", 100.0);
    let weighted = service
        .compare(&documents()[..2], Some(&indicators), &buildings_first)
        .expect("compare");
    assert_eq!(weighted.ranking[0].proposal_id, "A");
}

#[test]
fn null_exclusion_matches_non_selection() {
    let service = service();
    let proposals: Vec<ProposalIndicatorMap> = documents()
        .iter()
        .take(2)
        .map(|document| service.extract(document))
        .collect();
    let weights = WeightConfig::default()
        .with_indicator("built_area", 60.0)
        .with_indicator("green_area", 30.0);

    // B states no residents; A does.
    let with_residents = service
        .score(
            &proposals,
            Some(&selection(&["built_area", "green_area", "residents"])),
            &weights,
        )
        .expect("score");
    let without_residents = service
        .score(
            &proposals,
            Some(&selection(&["built_area", "green_area"])),
            &weights,
        )
        .expect("score");

    assert_eq!(
        with_residents.aggregate("B").and_then(|a| a.score),
        without_residents.aggregate("B").and_then(|a| a.score)
    );
}

#[test]
fn sheet_import_feeds_the_same_report() {
    let service = service();
    let sheet = service
        .import_sheet(&include_bytes!("fixtures/proposals.csv")[..])
        .expect("sheet imports");

    assert_eq!(sheet.unresolved_labels, vec!["Architektonická kvalita"]);
    let ids: Vec<&str> = sheet
        .proposals
        .iter()
        .map(|proposal| proposal.proposal_id.as_str())
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(sheet.proposals[1].raw_value("investment_cost"), Some(1620.0));
    assert_eq!(
        sheet.proposals[2].values["built_area"],
        ExtractedValue::not_found()
    );

    let indicators = selection(&["built_area", "green_area", "investment_cost"]);
    let report = service
        .report(sheet.proposals, Some(&indicators), &WeightConfig::default())
        .expect("report");
    let ranking: Vec<&str> = report
        .ranking
        .iter()
        .map(|entry| entry.proposal_id.as_str())
        .collect();
    assert_eq!(ranking, vec!["B", "C", "A"]);

    let c = report.board.cell("C", "green_area").expect("cell");
    let normalized = c.normalized_value.expect("normalized");
    assert!((normalized - 1350.0 / 4650.0 * 100.0).abs() < 1e-9);
}

#[test]
fn shares_of_maximum_sit_beside_min_max_scores() {
    let indicators = selection(&["green_area"]);
    let report = service()
        .compare(&documents()[..2], Some(&indicators), &WeightConfig::default())
        .expect("compare");

    let a_share = report
        .shares
        .iter()
        .find(|share| share.proposal_id == "A")
        .and_then(|share| share.share)
        .expect("share");
    assert!((a_share - 13650.0 / 18300.0 * 100.0).abs() < 1e-9);
    assert_eq!(
        report
            .board
            .cell("A", "green_area")
            .and_then(|cell| cell.normalized_value),
        Some(0.0)
    );
}
