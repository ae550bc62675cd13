use super::{FallbackSlots, IndicatorRegistry, ResidualRule};
use crate::comparison::domain::{ExtractionRule, IndicatorDefinition};

struct Entry {
    id: &'static str,
    name: &'static str,
    unit: &'static str,
    category: &'static str,
    lower_is_better: bool,
    patterns: fn() -> Vec<ExtractionRule>,
    synonyms: &'static [&'static str],
}

// Specific labels come before general ones; the first rule that matches wins.
const ENTRIES: &[Entry] = &[
    // Land use
    Entry {
        id: "total_area",
        name: "Plocha řešeného území",
        unit: "m²",
        category: "land_use",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::simple("plocha řešeného území"),
                ExtractionRule::parenthetical("plocha řešeného území"),
                ExtractionRule::simple("řešené území"),
            ]
        },
        synonyms: &[
            "plocha řešeného území",
            "řešené území",
            "site area",
            "plot area",
        ],
    },
    Entry {
        id: "built_area",
        name: "Zastavěná plocha",
        unit: "m²",
        category: "land_use",
        lower_is_better: true,
        patterns: || {
            vec![
                ExtractionRule::parenthetical("zastavěná plocha"),
                ExtractionRule::simple("zastavěná plocha"),
                ExtractionRule::simple("plocha zastavění"),
            ]
        },
        synonyms: &["zastavěná plocha", "plocha zastavění", "built-up area", "footprint"],
    },
    Entry {
        id: "green_area",
        name: "Plochy zeleně",
        unit: "m²",
        category: "land_use",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::parenthetical("plochy zeleně"),
                ExtractionRule::simple("plochy zeleně"),
                ExtractionRule::simple("plocha zeleně"),
                ExtractionRule::simple("zeleň"),
            ]
        },
        synonyms: &["plochy zeleně", "plocha zeleně", "zeleň", "green area", "greenery"],
    },
    Entry {
        id: "paved_area",
        name: "Zpevněné plochy",
        unit: "m²",
        category: "land_use",
        lower_is_better: true,
        patterns: || {
            vec![
                ExtractionRule::parenthetical("zpevněné plochy"),
                ExtractionRule::simple("zpevněné plochy"),
                ExtractionRule::simple("zpevněná plocha"),
            ]
        },
        synonyms: &["zpevněné plochy", "zpevněná plocha", "paved area", "hardscape"],
    },
    Entry {
        id: "other_area",
        name: "Ostatní plochy",
        unit: "m²",
        category: "land_use",
        lower_is_better: false,
        patterns: || vec![ExtractionRule::simple("ostatní plochy")],
        synonyms: &["ostatní plochy", "ostatní plocha", "other area"],
    },
    // Buildings
    Entry {
        id: "gross_floor_area",
        name: "Hrubá podlažní plocha",
        unit: "m²",
        category: "buildings",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::parenthetical("hrubá podlažní plocha"),
                ExtractionRule::simple("hrubá podlažní plocha"),
                ExtractionRule::simple("hpp"),
            ]
        },
        synonyms: &["hrubá podlažní plocha", "hpp", "gross floor area", "gfa"],
    },
    Entry {
        id: "floor_area_ratio",
        name: "Index podlažních ploch",
        unit: "",
        category: "buildings",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::simple("index podlažních ploch"),
                ExtractionRule::simple("ipp"),
            ]
        },
        synonyms: &["index podlažních ploch", "ipp", "floor area ratio", "far"],
    },
    Entry {
        id: "green_ratio",
        name: "Koeficient zeleně",
        unit: "%",
        category: "land_use",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::simple("koeficient zeleně"),
                ExtractionRule::simple("podíl zeleně"),
            ]
        },
        synonyms: &["koeficient zeleně", "podíl zeleně", "green ratio", "green share"],
    },
    Entry {
        id: "dwellings",
        name: "Počet bytů",
        unit: "ks",
        category: "buildings",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::simple("počet bytů"),
                ExtractionRule::simple("byty celkem"),
            ]
        },
        synonyms: &["počet bytů", "byty celkem", "number of dwellings", "dwelling units"],
    },
    Entry {
        id: "residents",
        name: "Počet obyvatel",
        unit: "",
        category: "buildings",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::simple("počet obyvatel"),
                ExtractionRule::simple("počet rezidentů"),
            ]
        },
        synonyms: &["počet obyvatel", "počet rezidentů", "residents", "population"],
    },
    // Mobility
    Entry {
        id: "parking_total",
        name: "Parkovací stání celkem",
        unit: "ks",
        category: "mobility",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::simple("parkovací stání celkem"),
                ExtractionRule::simple("počet parkovacích stání celkem"),
            ]
        },
        synonyms: &["parkovací stání celkem", "parking spaces total", "parking total"],
    },
    Entry {
        id: "parking_underground",
        name: "Parkovací stání v podzemí",
        unit: "ks",
        category: "mobility",
        lower_is_better: false,
        patterns: || {
            vec![
                ExtractionRule::first_run("parkovací stání v podzemí"),
                ExtractionRule::first_run("podzemní parkovací stání"),
            ]
        },
        synonyms: &[
            "parkovací stání v podzemí",
            "podzemní parkovací stání",
            "underground parking",
        ],
    },
    Entry {
        id: "parking_surface",
        name: "Parkovací stání na terénu",
        unit: "ks",
        category: "mobility",
        lower_is_better: true,
        patterns: || {
            vec![
                ExtractionRule::first_run("parkovací stání na terénu"),
                ExtractionRule::first_run("povrchová parkovací stání"),
            ]
        },
        synonyms: &[
            "parkovací stání na terénu",
            "povrchová parkovací stání",
            "surface parking",
        ],
    },
    // Economy
    Entry {
        id: "investment_cost",
        name: "Odhad investičních nákladů",
        unit: "mil. Kč",
        category: "economy",
        lower_is_better: true,
        patterns: || {
            vec![
                ExtractionRule::parenthetical("odhad investičních nákladů"),
                ExtractionRule::simple("odhad investičních nákladů"),
                ExtractionRule::simple("investiční náklady"),
            ]
        },
        synonyms: &[
            "odhad investičních nákladů",
            "investiční náklady",
            "investment cost",
            "construction cost estimate",
        ],
    },
];

pub(super) fn definitions() -> Vec<IndicatorDefinition> {
    ENTRIES
        .iter()
        .map(|entry| IndicatorDefinition {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            unit: entry.unit.to_string(),
            category: entry.category.to_string(),
            lower_is_better: entry.lower_is_better,
            patterns: (entry.patterns)(),
            synonyms: entry.synonyms.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

pub(super) fn registry() -> IndicatorRegistry {
    let residual = ResidualRule {
        indicator_id: "other_area".to_string(),
        total_id: "total_area".to_string(),
        component_ids: vec![
            "built_area".to_string(),
            "green_area".to_string(),
            "paved_area".to_string(),
        ],
    };
    let fallback = FallbackSlots {
        area: Some("total_area".to_string()),
        ratio: Some("green_ratio".to_string()),
        count: Some("dwellings".to_string()),
    };

    match IndicatorRegistry::new(definitions(), Some(residual), fallback) {
        Ok(registry) => registry,
        Err(err) => unreachable!("built-in indicator registry is invalid: {err}"),
    }
}
