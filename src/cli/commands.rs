use crate::cli::config::{AppConfig, build_pipeline_config, build_policy};
use crate::dom::dom_model::DocumentSnapshot;
use crate::error::DetectError;
use crate::messaging::messages::OutboundMessage;
use crate::pipeline::Pipeline;
use crate::settings::store::{InMemorySettings, SettingsStore, keys};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceLevel;

fn load_snapshot(path: &str) -> Result<DocumentSnapshot, DetectError> {
    let content = std::fs::read_to_string(path).map_err(|e| DetectError::SnapshotRead {
        path: path.to_string(),
        source: e,
    })?;
    DocumentSnapshot::parse(&content)
}

fn tracer_for(config: &AppConfig, settings: &InMemorySettings, verbose: u8) -> TraceLogger {
    // -vvv forces debug; otherwise the stored log_verbosity setting decides
    let min_level = if verbose >= 3 {
        TraceLevel::Debug
    } else {
        TraceLevel::parse(&settings.get_str(keys::LOG_VERBOSITY, "info"))
    };
    match (&config.trace.file, verbose) {
        (Some(path), _) => TraceLogger::new(path).with_min_level(min_level),
        (None, v) if v >= 2 => {
            TraceLogger::new("form-detection-trace.jsonl").with_min_level(min_level)
        }
        _ => TraceLogger::disabled(),
    }
}

pub fn cmd_analyze(
    snapshot_path: &str,
    strict: bool,
    format: &str,
    config: &AppConfig,
    settings: &InMemorySettings,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_snapshot(snapshot_path)?;
    let tracer = tracer_for(config, settings, verbose);
    let mut pipeline = Pipeline::assemble(
        build_pipeline_config(config, strict),
        build_policy(config),
    );

    let state = pipeline.verify_page(&doc, settings, &tracer);
    let analysis = pipeline
        .analysis()
        .ok_or_else(|| DetectError::SnapshotStructure("analysis produced nothing".into()))?;

    if format == "json" {
        let out = serde_json::json!({
            "url": doc.url,
            "pageType": analysis.page_type,
            "reason": analysis.reason,
            "activationState": state.as_str(),
            "candidates": analysis.candidates,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("=== {} ===", doc.url);
    println!(
        "page type: {} ({})",
        analysis.page_type.as_str(),
        analysis.reason
    );
    println!("activation: {}", state);
    for (i, c) in analysis.candidates.iter().enumerate() {
        println!(
            "\n[{}] {} — {} field(s)",
            i,
            if c.candidate.identifier.is_empty() {
                "(anonymous)"
            } else {
                c.candidate.identifier.as_str()
            },
            c.candidate.fields.len()
        );
        println!(
            "    type: {} (confidence {:.2})",
            c.classification.form_type, c.classification.confidence
        );
        println!(
            "    score: {:.1} legitimate: {} [{}]",
            c.verdict.score,
            c.verdict.legitimate,
            c.verdict.reason_code.as_str()
        );
        if let Some(e) = &c.exclusion {
            println!("    excluded: {} ({})", e.reason, e.detail);
        }
    }
    Ok(())
}

pub fn cmd_score(
    snapshot_path: &str,
    index: usize,
    config: &AppConfig,
    settings: &InMemorySettings,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_snapshot(snapshot_path)?;
    let tracer = tracer_for(config, settings, verbose);
    let mut pipeline = Pipeline::assemble(
        build_pipeline_config(config, false),
        build_policy(config),
    );
    pipeline.verify_page(&doc, settings, &tracer);

    let analysis = pipeline
        .analysis()
        .ok_or_else(|| DetectError::SnapshotStructure("analysis produced nothing".into()))?;
    let candidate = analysis
        .candidates
        .get(index)
        .ok_or(DetectError::CandidateIndex {
            index,
            count: analysis.candidates.len(),
        })?;

    println!(
        "candidate {} — total {:.1} ({})",
        index,
        candidate.verdict.score,
        candidate.verdict.reason_code.as_str()
    );
    for f in &candidate.verdict.breakdown.factors {
        println!(
            "  {:<30} raw {:>5.1}  weight {:>3}  -> {:>5.2}",
            f.name, f.raw, f.weight, f.contribution
        );
    }
    Ok(())
}

pub fn cmd_diagnose(
    snapshot_path: &str,
    config: &AppConfig,
    settings: &InMemorySettings,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_snapshot(snapshot_path)?;
    let tracer = tracer_for(config, settings, verbose);
    let mut pipeline = Pipeline::assemble(
        build_pipeline_config(config, false),
        build_policy(config),
    );
    pipeline.verify_page(&doc, settings, &tracer);

    let message = OutboundMessage::DiagnosticReport(pipeline.diagnostic_report(settings.snapshot()));
    let json = serde_json::to_string_pretty(&message).map_err(|e| DetectError::MessageSerialize {
        context: "diagnostic report".to_string(),
        source: e,
    })?;
    println!("{}", json);
    Ok(())
}
