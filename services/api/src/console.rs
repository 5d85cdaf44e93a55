use crate::infra::{load_registry, selection_service_with};
use clap::{Args, ValueEnum};
use school_select::config::AppConfig;
use school_select::error::AppError;
use school_select::telemetry::{self, LogSink};
use school_select::workflows::registry::{Region, SchoolRecord};
use school_select::workflows::selection::{
    DocumentRenderer, EligibilityCriteria, PdfRenderer, PlainTextRenderer,
    SchoolSelectionService, SelectionRequest, NO_MATCH_MESSAGE,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct RegistryArgs {
    /// Register sheet exported as CSV; repeat to load several sheets in order.
    /// Falls back to APP_REGISTRY_PATH.
    #[arg(long = "registry", value_name = "PATH")]
    pub(crate) paths: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct CriteriaArgs {
    /// Predicted BECE aggregate (6-30)
    #[arg(long)]
    pub(crate) aggregate: u8,
    /// Student gender as it appears in the register, e.g. Male or Female
    #[arg(long)]
    pub(crate) gender: String,
    /// Preferred region; repeat for up to three
    #[arg(long = "region", value_name = "REGION", required = true)]
    pub(crate) regions: Vec<String>,
    /// Career keyword matched against programmes offered
    #[arg(long)]
    pub(crate) career: Option<String>,
    /// Only technical/vocational schools in categories A to C
    #[arg(long)]
    pub(crate) tvet_only: bool,
    /// Only schools offering science or STEM programmes
    #[arg(long)]
    pub(crate) stem_only: bool,
}

impl CriteriaArgs {
    pub(crate) fn into_criteria(self) -> EligibilityCriteria {
        EligibilityCriteria {
            aggregate_score: self.aggregate,
            gender: self.gender,
            preferred_regions: self.regions.iter().map(|region| Region::new(region)).collect(),
            career_keyword: self.career,
            tvet_only: self.tvet_only,
            stem_only: self.stem_only,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct FilterArgs {
    #[command(flatten)]
    pub(crate) registry: RegistryArgs,
    #[command(flatten)]
    pub(crate) criteria: CriteriaArgs,
}

/// Output format of the selection form.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FormFormat {
    #[default]
    Pdf,
    Text,
}

#[derive(Args, Debug)]
pub(crate) struct FormArgs {
    #[command(flatten)]
    pub(crate) registry: RegistryArgs,
    /// Student name printed on the form
    #[arg(long)]
    pub(crate) name: String,
    #[command(flatten)]
    pub(crate) criteria: CriteriaArgs,
    /// Main choice school code in rank order; repeat five times
    #[arg(long, value_name = "CODE")]
    pub(crate) main: Vec<String>,
    /// Alternative school code from the appendix pool; repeat twice
    #[arg(long, value_name = "CODE")]
    pub(crate) alternate: Vec<String>,
    /// Output file (defaults to the renderer's file name in the current directory)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = FormFormat::Pdf)]
    pub(crate) format: FormFormat,
}

fn prepare<D>(paths: Vec<PathBuf>, renderer: D) -> Result<SchoolSelectionService<D>, AppError>
where
    D: DocumentRenderer + 'static,
{
    let config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, LogSink::Stderr)?;
    let import = load_registry(paths, &config.selection)?;
    let summary = import.summary;
    if summary.skipped_incomplete + summary.skipped_duplicate + summary.repaired_encoding > 0 {
        eprintln!(
            "Register loaded: {} schools ({} incomplete rows, {} duplicate codes skipped, \
             {} rows with unreadable characters repaired)",
            summary.loaded,
            summary.skipped_incomplete,
            summary.skipped_duplicate,
            summary.repaired_encoding
        );
    }
    Ok(selection_service_with(import, renderer, &config.selection))
}

pub(crate) fn run_regions(args: RegistryArgs) -> Result<(), AppError> {
    let service = prepare(args.paths, PdfRenderer::default())?;
    println!("Regions in the school register");
    for region in service.regions() {
        println!("- {region}");
    }
    Ok(())
}

pub(crate) fn run_filter(args: FilterArgs) -> Result<(), AppError> {
    let service = prepare(args.registry.paths, PdfRenderer::default())?;
    let criteria = args.criteria.into_criteria();
    print!("{}", candidate_listing(&service, &criteria)?);
    Ok(())
}

pub(crate) fn run_form(args: FormArgs) -> Result<(), AppError> {
    let FormArgs {
        registry,
        name,
        criteria,
        main,
        alternate,
        output,
        format,
    } = args;

    let request = SelectionRequest {
        main_codes: main,
        alternate_codes: alternate,
    };
    let criteria = criteria.into_criteria();
    let path = match format {
        FormFormat::Pdf => {
            let service = prepare(registry.paths, PdfRenderer::default())?;
            write_form(&service, &name, &criteria, &request, output)?
        }
        FormFormat::Text => {
            let service = prepare(registry.paths, PlainTextRenderer::default())?;
            write_form(&service, &name, &criteria, &request, output)?
        }
    };
    println!("Selection form written to {}", path.display());
    Ok(())
}

pub(crate) fn candidate_listing<D>(
    service: &SchoolSelectionService<D>,
    criteria: &EligibilityCriteria,
) -> Result<String, AppError>
where
    D: DocumentRenderer + 'static,
{
    let candidates = service.candidates(criteria)?;
    if candidates.is_empty() {
        return Ok(format!("{NO_MATCH_MESSAGE}\n"));
    }

    let mut out = format!("Schools matching your criteria: {}\n", candidates.schools.len());
    for record in &candidates.schools {
        out.push_str(&school_line(record));
    }

    let marker = service.guard().policy().appendix_marker();
    if candidates.appendix_pool.is_empty() {
        out.push_str(&format!(
            "\nNo {marker} schools among your matches; widen your regions to find alternatives.\n"
        ));
    } else {
        out.push_str(&format!("\nAlternative pool ({marker})\n"));
        for record in &candidates.appendix_pool {
            out.push_str(&school_line(record));
        }
    }
    Ok(out)
}

fn school_line(record: &SchoolRecord) -> String {
    format!(
        "- {} | {} | {} | Category {} | Cutoff {} | {}\n",
        record.code,
        record.name,
        record.region,
        record.category,
        record.cutoff.as_deref().unwrap_or("-"),
        record.programmes_offered
    )
}

pub(crate) fn write_form<D>(
    service: &SchoolSelectionService<D>,
    student_name: &str,
    criteria: &EligibilityCriteria,
    request: &SelectionRequest,
    output: Option<PathBuf>,
) -> Result<PathBuf, AppError>
where
    D: DocumentRenderer + 'static,
{
    let document = service.form(student_name, criteria, request)?;
    let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));
    std::fs::write(&path, &document.bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::sample_register;
    use school_select::config::SelectionConfig;
    use school_select::workflows::registry::RegistryImporter;
    use school_select::workflows::selection::SelectionError;

    fn service_with<D>(renderer: D) -> SchoolSelectionService<D>
    where
        D: DocumentRenderer + 'static,
    {
        let import = RegistryImporter::from_path(sample_register()).expect("sample imports");
        let config = SelectionConfig {
            selection_year: 2025,
            ..SelectionConfig::default()
        };
        selection_service_with(import, renderer, &config)
    }

    fn service() -> SchoolSelectionService<PlainTextRenderer> {
        service_with(PlainTextRenderer::default())
    }

    fn form_request() -> SelectionRequest {
        SelectionRequest {
            main_codes: ["0010105", "0020205", "0010106", "0020202", "0040403"]
                .map(str::to_string)
                .to_vec(),
            alternate_codes: ["0010103", "0020204"].map(str::to_string).to_vec(),
        }
    }

    fn criteria(regions: &[&str]) -> EligibilityCriteria {
        CriteriaArgs {
            aggregate: 12,
            gender: "Female".to_string(),
            regions: regions.iter().map(|region| region.to_string()).collect(),
            career: None,
            tvet_only: false,
            stem_only: false,
        }
        .into_criteria()
    }

    #[test]
    fn listing_shows_matches_and_appendix_pool() {
        let listing =
            candidate_listing(&service(), &criteria(&["Central"])).expect("listing builds");
        assert!(listing.starts_with("Schools matching your criteria: 1\n"));
        assert!(listing.contains("- 0040403 | Cape Coast Technical Institute | Central"));
        assert!(listing.contains("Alternative pool (APPENDIX 3)"));
    }

    #[test]
    fn listing_reports_no_match() {
        let listing =
            candidate_listing(&service(), &criteria(&["Upper East"])).expect("listing builds");
        assert_eq!(listing, format!("{NO_MATCH_MESSAGE}\n"));
    }

    #[test]
    fn listing_rejects_too_many_regions() {
        let result = candidate_listing(
            &service(),
            &criteria(&["Central", "Volta", "Ashanti", "Northern"]),
        );
        assert!(matches!(
            result,
            Err(AppError::Selection(SelectionError::Criteria(_)))
        ));
    }

    #[test]
    fn write_form_saves_rendered_document() {
        let request = form_request();
        let output = std::env::temp_dir().join(format!(
            "school-select-form-{}.txt",
            std::process::id()
        ));

        let path = write_form(
            &service(),
            "Akosua Frimpong",
            &criteria(&["Greater Accra", "Ashanti", "Central"]),
            &request,
            Some(output.clone()),
        )
        .expect("form written");

        assert_eq!(path, output);
        let text = std::fs::read_to_string(&path).expect("form readable");
        assert!(text.contains("Name: Akosua Frimpong"));
        assert!(text.contains("6. Accra Technical Training Centre"));
        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn write_form_defaults_to_pdf() {
        let output = std::env::temp_dir().join(format!(
            "school-select-form-{}.pdf",
            std::process::id()
        ));

        let path = write_form(
            &service_with(PdfRenderer::default()),
            "Akosua Frimpong",
            &criteria(&["Greater Accra", "Ashanti", "Central"]),
            &form_request(),
            Some(output.clone()),
        )
        .expect("form written");

        let bytes = std::fs::read(&path).expect("form readable");
        assert!(bytes.starts_with(b"%PDF"));
        std::fs::remove_file(&path).expect("cleanup");
        assert_eq!(FormFormat::default(), FormFormat::Pdf);
    }
}
