use crate::cli::{DemoArgs, ExtractArgs, ScoreArgs, ScoringArgs};
use crate::infra::{build_service, load_weights};
use proposal_scoring::comparison::{
    ComparisonReport, ComparisonService, ProposalDocument, ProposalIndicatorMap, WeightConfig,
};
use proposal_scoring::config::AppConfig;
use proposal_scoring::error::AppError;
use std::fs::File;
use std::io::BufReader;

const SAMPLE_PROPOSALS: &[(&str, &str)] = &[
    (
        "north-park",
        "Návrh 01 - Severní park\n\
         Plocha řešeného území 40 690 m²\n\
         Zastavěná plocha (objekty) 12 650 m²\n\
         Plochy zeleně 13 650 m²\n\
         Zpevněné plochy 14 390 m²\n\
         Hrubá podlažní plocha 52 300 m²\n\
         Koeficient zeleně 34 %\n\
         Počet bytů 420 ks\n\
         Parkovací stání celkem 480\n\
         Parkovací stání v podzemí 430 ks 215 000 000\n\
         Parkovací stání na terénu 50 ks 5 000 000\n\
         Odhad investičních nákladů 1 850 mil. Kč",
    ),
    (
        "river-blocks",
        "Návrh 02 - Bloky u řeky\n\
         Plocha řešeného území: 40 690 m²\n\
         Zastavěná plocha: 10 200 m²\n\
         Plochy zeleně: 18 300 m²\n\
         Zpevněné plochy: 9 800 m²\n\
         Ostatní plochy: 2 390 m²\n\
         Hrubá podlažní plocha: 47 900 m²\n\
         Koeficient zeleně: 45 %\n\
         Počet bytů: 380 ks\n\
         Parkovací stání celkem: 400\n\
         Parkovací stání v podzemí: 360 ks\n\
         Parkovací stání na terénu: 40 ks\n\
         Odhad investičních nákladů: 1 620 mil. Kč",
    ),
    (
        "garden-town",
        "Návrh 03 - Zahradní město\n\
         Koncept počítá s územím o rozloze 40 690 m², ve kterém zeleň zabírá 41 % \
         a vznikne 360 nových domovů.",
    ),
];

pub(crate) fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let ExtractArgs {
        document,
        proposal_id,
        json,
    } = args;

    let service = load_service()?;
    let text = std::fs::read_to_string(&document)?;
    let proposal_id = proposal_id.unwrap_or_else(|| {
        document
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "proposal".to_string())
    });

    let map = service.extract(&ProposalDocument { proposal_id, text });
    if json {
        print_json(&map)?;
    } else {
        render_extraction(&service, &map);
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { sheet, scoring } = args;

    let service = load_service()?;
    let reader = BufReader::new(File::open(&sheet)?);
    let imported = service.import_sheet(reader)?;
    for label in &imported.unresolved_labels {
        eprintln!("warning: no indicator matches sheet label '{label}'");
    }

    let weights = resolve_weights(&scoring)?;
    let report = service.report(imported.proposals, selection(&scoring), &weights)?;
    if scoring.json {
        print_json(&report)?;
    } else {
        render_report(&service, &report);
    }
    Ok(())
}

pub(crate) fn run_indicators() -> Result<(), AppError> {
    let service = load_service()?;
    println!("{:<22} {:<12} {:<8} {:<6} name", "id", "category", "unit", "best");
    for indicator in service.registry().indicators() {
        println!(
            "{:<22} {:<12} {:<8} {:<6} {}",
            indicator.id,
            indicator.category,
            indicator.unit,
            if indicator.lower_is_better { "low" } else { "high" },
            indicator.name
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { scoring } = args;

    let service = load_service()?;
    let weights = resolve_weights(&scoring)?;
    let documents = sample_documents();
    let report = service.compare(&documents, selection(&scoring), &weights)?;

    if scoring.json {
        print_json(&report)?;
        return Ok(());
    }

    println!("Proposal comparison demo ({} proposals)", documents.len());
    for map in &report.proposals {
        println!();
        render_extraction(&service, map);
    }
    println!();
    render_report(&service, &report);
    Ok(())
}

fn load_service() -> Result<ComparisonService, AppError> {
    let config = AppConfig::load()?;
    build_service(&config.scoring)
}

fn selection(args: &ScoringArgs) -> Option<&[String]> {
    if args.indicators.is_empty() {
        None
    } else {
        Some(args.indicators.as_slice())
    }
}

fn resolve_weights(args: &ScoringArgs) -> Result<WeightConfig, AppError> {
    let mut weights = load_weights(args.weights.as_deref())?;
    for (indicator, percent) in &args.indicator_weights {
        weights.indicators.insert(indicator.clone(), *percent);
    }
    for (category, percent) in &args.category_weights {
        weights.categories.insert(category.clone(), *percent);
    }
    Ok(weights)
}

pub(crate) fn sample_documents() -> Vec<ProposalDocument> {
    SAMPLE_PROPOSALS
        .iter()
        .map(|(id, text)| ProposalDocument {
            proposal_id: id.to_string(),
            text: text.to_string(),
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn render_extraction(service: &ComparisonService, map: &ProposalIndicatorMap) {
    println!("Proposal {}", map.proposal_id);
    for indicator in service.registry().indicators() {
        let Some(value) = map.values.get(&indicator.id) else {
            continue;
        };
        let shown = value
            .value
            .map(|number| format_number(number, &indicator.unit))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<28} {:>16}  {:<9} {}",
            indicator.name,
            shown,
            value.confidence.label(),
            value.evidence
        );
    }
}

fn render_report(service: &ComparisonService, report: &ComparisonReport) {
    println!("Ranking");
    for entry in &report.ranking {
        let aggregate = report.board.aggregate(&entry.proposal_id);
        let score = entry
            .score
            .map(|score| format!("{score:.1}"))
            .unwrap_or_else(|| "n/a".to_string());
        let (used, missing) = aggregate
            .map(|aggregate| (aggregate.indicators_used, aggregate.indicators_missing))
            .unwrap_or_default();
        println!(
            "  {:>2}. {:<16} {:>6}  ({used} indicators, {missing} missing)",
            entry.rank, entry.proposal_id, score
        );
    }

    println!("\nBest in class");
    for indicator in service.registry().indicators() {
        let best = report.board.best_in_class(&indicator.id);
        if best.is_empty() {
            continue;
        }
        println!("  {:<28} {}", indicator.name, best.join(", "));
    }

    if !report.review.is_empty() {
        println!("\nNeeds review");
        for flag in &report.review {
            println!(
                "  {:<16} {:<22} {} ({})",
                flag.proposal_id,
                flag.indicator_id,
                flag.confidence.label(),
                flag.evidence
            );
        }
    }
}

fn format_number(value: f64, unit: &str) -> String {
    let number = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    if unit.is_empty() {
        number
    } else {
        format!("{number} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposal_scoring::comparison::{
        Confidence, IndicatorRegistry, DEFAULT_MATCH_THRESHOLD,
    };

    fn service() -> ComparisonService {
        ComparisonService::new(IndicatorRegistry::standard(), DEFAULT_MATCH_THRESHOLD)
            .expect("standard registry compiles")
    }

    #[test]
    fn sample_proposals_rank_deterministically() {
        let service = service();
        let first = service
            .compare(&sample_documents(), None, &WeightConfig::default())
            .expect("compare");
        let second = service
            .compare(&sample_documents(), None, &WeightConfig::default())
            .expect("compare");
        assert_eq!(first, second);
        assert_eq!(first.ranking.len(), 3);
    }

    #[test]
    fn prose_sample_relies_on_fallback() {
        let report = service()
            .compare(&sample_documents(), None, &WeightConfig::default())
            .expect("compare");
        let garden = report
            .proposals
            .iter()
            .find(|map| map.proposal_id == "garden-town")
            .expect("garden town extracted");
        assert_eq!(garden.values["total_area"].confidence, Confidence::Fallback);
        assert!(report
            .review
            .iter()
            .all(|flag| flag.proposal_id == "garden-town"));
    }

    #[test]
    fn command_line_overrides_extend_weight_file() {
        let args = ScoringArgs {
            indicator_weights: vec![("built_area".to_string(), 60.0)],
            category_weights: vec![("economy".to_string(), 25.0)],
            ..ScoringArgs::default()
        };
        let weights = resolve_weights(&args).expect("weights");
        assert_eq!(weights.indicator_percent("built_area"), 60.0);
        assert_eq!(weights.category_percent("economy"), 25.0);
        assert_eq!(weights.indicator_percent("green_area"), 100.0);
    }

    #[test]
    fn numbers_render_with_units() {
        assert_eq!(format_number(40690.0, "m²"), "40690 m²");
        assert_eq!(format_number(1.29, ""), "1.29");
    }
}
