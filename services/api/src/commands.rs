use crate::infra::file_sources;
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use isf_assess::config::AppConfig;
use isf_assess::error::AppError;
use isf_assess::workflows::assessment::report::{due_diligence_flags, next_report_id};
use isf_assess::workflows::assessment::{
    AssessmentReport, AssessmentService, Criterion, Score, ScoreOverrides, ScoredAssessment,
    ScoringEngine, Urn, WeightTable,
};
use isf_assess::workflows::forecast::{
    CatchmentImporter, ForecastRequest, ForecastRequestError, ForecastResult,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// School URN to assess
    pub(crate) urn: String,
    /// Evaluation date for inspection-age checks (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Manual score as criterion=1-5, or criterion=tbc to clear the auto-score
    #[arg(
        long = "override",
        value_name = "CRITERION=SCORE",
        value_parser = crate::infra::parse_override
    )]
    pub(crate) overrides: Vec<(Criterion, Score)>,
    /// Write the markdown report to this path
    #[arg(long)]
    pub(crate) save_markdown: Option<PathBuf>,
    /// Print the full assessment as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ForecastArgs {
    /// Unplaced learners in the catchment (defaults to the catchment export total)
    #[arg(long)]
    pub(crate) unplaced: Option<u32>,
    /// SEND insights catchment export (CSV)
    #[arg(long)]
    pub(crate) catchment_csv: Option<PathBuf>,
    /// Candidate facility capacity; repeat for several (defaults to 12, 18, 24, 30)
    #[arg(long = "capacity", value_name = "PLACES")]
    pub(crate) capacities: Vec<u32>,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        urn,
        today,
        overrides,
        save_markdown,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = AssessmentService::new(
        file_sources(&config.data),
        ScoringEngine::new(WeightTable::default()),
    );

    let urn = Urn(urn);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let overrides: ScoreOverrides = overrides.into_iter().collect();
    let assessment = service.assess(&urn, overrides, today).await;

    if assessment.outcome.school.is_none() {
        for error in &assessment.outcome.errors {
            eprintln!("{error}");
        }
        return Err(AppError::SchoolNotFound(urn));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        render_assessment(&assessment);
    }

    if let Some(path) = save_markdown {
        let report = AssessmentReport::compose(next_report_id(), &assessment, None, Utc::now());
        std::fs::write(&path, report.markdown)?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let ForecastArgs {
        unplaced,
        catchment_csv,
        capacities,
    } = args;

    let las = match catchment_csv {
        Some(path) => {
            CatchmentImporter::from_path(path)
                .map_err(ForecastRequestError::from)?
                .local_authorities
        }
        None => Vec::new(),
    };

    let request = ForecastRequest {
        unplaced,
        las,
        catchment_csv: None,
        capacities: (!capacities.is_empty()).then_some(capacities),
    };
    let result = request.run()?;
    render_forecast(&result);
    Ok(())
}

fn score_cell(score: Score) -> String {
    match score.grade() {
        Some(grade) => format!("{}/5", grade.get()),
        None => "TBC".to_string(),
    }
}

fn render_assessment(assessment: &ScoredAssessment) {
    let outcome = &assessment.outcome;
    let name = outcome
        .school
        .as_ref()
        .map_or(outcome.urn.0.as_str(), |school| school.display_name());

    println!("School assessment: {name} (URN {})", outcome.urn);
    if let Some(la) = outcome.local_authority.as_ref() {
        let pool = la
            .pool()
            .map_or_else(|| "unknown".to_string(), |pool| pool.get().to_string());
        println!("- Local authority: {} (Safety Valve pool {pool})", la.la_name);
    }
    if let Some(company) = outcome.company.as_ref() {
        println!(
            "- Company: {} ({}, {})",
            company.company_name, company.company_number, company.company_status
        );
    }

    println!("\nCriterion scores");
    for row in &assessment.result.breakdown {
        let auto = outcome.scores.get(&row.criterion);
        let confidence = if assessment.overrides.contains_key(&row.criterion) {
            "OVERRIDE"
        } else {
            auto.map_or("MANUAL", |auto| auto.confidence.label())
        };
        println!(
            "  - {} (x{}): {} [{confidence}]",
            row.label,
            row.weight,
            score_cell(row.score)
        );
        if let Some(auto) = auto {
            println!("      {}", auto.rationale);
        }
    }

    let flags = due_diligence_flags(assessment);
    if flags.is_empty() {
        println!("\nDue diligence flags: none identified");
    } else {
        println!("\nDue diligence flags");
        for flag in flags {
            println!("  - {flag}");
        }
    }

    let result = &assessment.result;
    println!(
        "\nScore: {:.1}% ({}/{}) -> {}",
        result.percentage,
        result.total_score,
        result.max_possible,
        result.decision.label()
    );
    println!("Recommendation: {}", result.decision.summary());
}

fn render_forecast(result: &ForecastResult) {
    println!("Commissioning forecast");
    println!(
        "- {} unplaced learners -> {} addressable",
        result.total_unplaced, result.addressable_demand
    );
    println!(
        "- {} local authorities | {}% in pools 1-2 | pools {:?}",
        result.total_las, result.la_quality_percent, result.pool_counts
    );

    println!("\nScenarios");
    for scenario in &result.scenarios {
        let marker = if scenario.capacity == result.recommended_capacity {
            " (recommended)"
        } else {
            ""
        };
        println!(
            "  - {} places{marker}: ratio {}:1 [{}] | opening {}-{}% ({}-{} pupils) | year one {}-{}% ({}-{} pupils)",
            scenario.capacity,
            scenario.demand_ratio,
            scenario.confidence.label(),
            scenario.opening_fill_range.0,
            scenario.opening_fill_range.1,
            scenario.opening_places_range.0,
            scenario.opening_places_range.1,
            scenario.year_one_fill_range.0,
            scenario.year_one_fill_range.1,
            scenario.year_one_places_range.0,
            scenario.year_one_places_range.1,
        );
    }
}
