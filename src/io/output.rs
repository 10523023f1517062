use crate::analysis::metrics::{COUPLING_SCORE, TOTAL_DEPENDENCIES, TOTAL_SERVICES};
use crate::core::{
    ArchitectureAnalysis, RefactorPlan, RegressionRisk, RiskLevel, Severity,
};
use crate::planning::MigrationStrategy;
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_analysis(&mut self, analysis: &ArchitectureAnalysis) -> anyhow::Result<()>;
    fn write_plan(&mut self, plan: &RefactorPlan) -> anyhow::Result<()>;
    fn write_risks(&mut self, risks: &[RegressionRisk]) -> anyhow::Result<()>;
    fn write_strategies(&mut self, strategies: &[MigrationStrategy]) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_value<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(self.writer, "{json}")?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_analysis(&mut self, analysis: &ArchitectureAnalysis) -> anyhow::Result<()> {
        self.write_value(analysis)
    }

    fn write_plan(&mut self, plan: &RefactorPlan) -> anyhow::Result<()> {
        self.write_value(plan)
    }

    fn write_risks(&mut self, risks: &[RegressionRisk]) -> anyhow::Result<()> {
        self.write_value(risks)
    }

    fn write_strategies(&mut self, strategies: &[MigrationStrategy]) -> anyhow::Result<()> {
        self.write_value(strategies)
    }
}

/// Short human-readable summaries
pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn header(&mut self, title: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", title.bold().blue())?;
        writeln!(self.writer, "{}", "=".repeat(title.len()).blue())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.as_str().to_uppercase();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.normal(),
    }
}

fn risk_label(risk: RiskLevel) -> ColoredString {
    match risk {
        RiskLevel::High => risk.as_str().red(),
        RiskLevel::Medium => risk.as_str().yellow(),
        RiskLevel::Low => risk.as_str().green(),
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_analysis(&mut self, analysis: &ArchitectureAnalysis) -> anyhow::Result<()> {
        self.header("Architecture Analysis")?;
        writeln!(self.writer, "Summary:")?;
        writeln!(self.writer, "  Services: {}", analysis.metric(TOTAL_SERVICES))?;
        writeln!(self.writer, "  Dependencies: {}", analysis.metric(TOTAL_DEPENDENCIES))?;
        writeln!(
            self.writer,
            "  Coupling score: {:.2}",
            analysis.metric(COUPLING_SCORE)
        )?;
        writeln!(self.writer)?;

        for (name, service) in &analysis.services {
            writeln!(
                self.writer,
                "  {} files={} endpoints={} complexity={} tables={}",
                name.bold(),
                service.file_count(),
                service.endpoint_count(),
                service.total_complexity,
                service.tables.len()
            )?;
        }

        if !analysis.code_smells.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "Code smells:")?;
            for smell in &analysis.code_smells {
                writeln!(
                    self.writer,
                    "  [{}] {} {}: {}",
                    severity_label(smell.severity),
                    smell.smell_type.as_str(),
                    smell.location,
                    smell.description
                )?;
            }
        }

        if !analysis.recommendations.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "Recommendations:")?;
            for recommendation in &analysis.recommendations {
                writeln!(self.writer, "  - {recommendation}")?;
            }
        }

        for area in &analysis.risk_areas {
            writeln!(self.writer, "  {} {}", "!".yellow().bold(), area.description)?;
        }
        Ok(())
    }

    fn write_plan(&mut self, plan: &RefactorPlan) -> anyhow::Result<()> {
        self.header("Refactor Plan")?;
        writeln!(self.writer, "Plan {} ({})", plan.id, plan.target_architecture)?;
        writeln!(
            self.writer,
            "  Safety level: {}  Total effort: {}h  Risk score: {}",
            plan.safety_level, plan.total_effort, plan.risk_assessment.total_risk_score
        )?;
        if plan.dependency_cycle {
            writeln!(
                self.writer,
                "  {}",
                "Warning: step dependencies are cyclic; steps are not in dependency order"
                    .yellow()
                    .bold()
            )?;
        }
        writeln!(self.writer)?;

        for (position, step) in plan.steps.iter().enumerate() {
            writeln!(
                self.writer,
                "  {:>2}. {} [{}] {}h  {}",
                position + 1,
                step.id.bold(),
                risk_label(step.risk_level),
                step.estimated_effort,
                step.description
            )?;
        }

        if !plan.risk_assessment.critical_paths.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "Critical paths:")?;
            for path in &plan.risk_assessment.critical_paths {
                writeln!(self.writer, "  {}", path.join(" -> "))?;
            }
        }

        writeln!(self.writer)?;
        writeln!(self.writer, "Success criteria:")?;
        for criterion in &plan.success_criteria {
            writeln!(self.writer, "  - {criterion}")?;
        }
        Ok(())
    }

    fn write_risks(&mut self, risks: &[RegressionRisk]) -> anyhow::Result<()> {
        self.header("Regression Risks")?;
        if risks.is_empty() {
            writeln!(self.writer, "{}", "No regression risks detected".green())?;
            return Ok(());
        }
        for risk in risks {
            writeln!(
                self.writer,
                "  [{}] {}: {} ({})",
                severity_label(risk.severity),
                risk.risk_type.as_str(),
                risk.description,
                risk.affected_components.join(", ")
            )?;
            if let Some(mitigation) = &risk.mitigation {
                writeln!(self.writer, "      mitigation: {mitigation}")?;
            }
        }
        Ok(())
    }

    fn write_strategies(&mut self, strategies: &[MigrationStrategy]) -> anyhow::Result<()> {
        self.header("Migration Strategies")?;
        for strategy in strategies {
            writeln!(
                self.writer,
                "{} ({}), {} days",
                strategy.name.bold(),
                strategy.key,
                strategy.estimated_duration
            )?;
            writeln!(self.writer, "  {}", strategy.description)?;
            for phase in &strategy.phases {
                writeln!(self.writer, "    - {} ({}d)", phase.name, phase.duration)?;
            }
            writeln!(self.writer, "  Prerequisites: {}", strategy.prerequisites.join(", "))?;
            writeln!(self.writer, "  Risks: {}", strategy.risks.join(", "))?;
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(std::io::stdout())),
    }
}
