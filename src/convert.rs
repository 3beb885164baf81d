//! Pure conversion functions: TOML config structs -> crate API types.

use anyhow::{Context, Result, bail};

use gcmqm_calendar::parse_date;
use gcmqm_grid::{Adjustment, Bounds, DateBounds, VariableDescriptor};
use gcmqm_pipeline::{ExperimentSpec, GcmSpec, RunPlan, VariableSpec};
use gcmqm_quantile_map::{Extrapolation, Fallback, FitMethod, QmConfig};

use crate::config::*;

/// GCM whose files carry duplicate (lon, lat, time) rows unless told
/// otherwise.
const DUPLICATING_GCM: &str = "HadGEM2";

/// Parses a fitting method name.
pub fn parse_method(s: &str) -> Result<FitMethod> {
    match s.to_lowercase().as_str() {
        "empirical" => Ok(FitMethod::Empirical),
        "gamma" => Ok(FitMethod::Gamma),
        other => bail!("unknown method: {other:?}"),
    }
}

/// Parses an extrapolation rule name.
pub fn parse_extrapolation(s: &str) -> Result<Extrapolation> {
    match s.to_lowercase().as_str() {
        "constant" => Ok(Extrapolation::Constant),
        "clamp" => Ok(Extrapolation::Clamp),
        other => bail!("unknown extrapolation: {other:?}"),
    }
}

/// Parses a fallback policy name.
pub fn parse_fallback(s: &str) -> Result<Fallback> {
    match s.to_lowercase().as_str() {
        "identity" => Ok(Fallback::Identity),
        "missing" => Ok(Fallback::Missing),
        other => bail!("unknown fallback: {other:?}"),
    }
}

/// Converts a `[min, max]` pair into [`Bounds`].
pub fn build_bounds(pair: [f64; 2], label: &str) -> Result<Bounds> {
    Bounds::new(pair[0], pair[1]).with_context(|| format!("invalid {label}"))
}

/// Converts a `[start, end]` pair of `YYYY-MM-DD` strings into
/// [`DateBounds`].
pub fn build_date_bounds(pair: &[String; 2], label: &str) -> Result<DateBounds> {
    let start = parse_date(&pair[0]).with_context(|| format!("invalid {label} start"))?;
    let end = parse_date(&pair[1]).with_context(|| format!("invalid {label} end"))?;
    DateBounds::new(start, end).with_context(|| format!("invalid {label}"))
}

/// Converts `add`/`mult` into an [`Adjustment`]; at most one may be set.
pub fn build_adjustment(add: Option<f64>, mult: Option<f64>) -> Result<Adjustment> {
    match (add, mult) {
        (None, None) => Ok(Adjustment::None),
        (Some(a), None) => Ok(Adjustment::Add(a)),
        (None, Some(m)) => Ok(Adjustment::Mult(m)),
        (Some(_), Some(_)) => bail!("only one of add or mult may be set"),
    }
}

/// Observation variable name used for a model variable when none is given.
pub fn default_obs_name(variable: &str) -> Option<&'static str> {
    match variable {
        "tas" => Some("tave"),
        "pr" => Some("precip"),
        _ => None,
    }
}

/// Builds a [`QmConfig`] from a variable table.
pub fn build_qm_config(v: &VariableToml) -> Result<QmConfig> {
    let cfg = QmConfig::new()
        .with_method(parse_method(&v.method)?)
        .with_qstep(v.qstep)
        .with_min_pairs(v.min_pairs)
        .with_wet_day_threshold(v.wet_day)
        .with_extrapolation(parse_extrapolation(&v.extrapolation)?)
        .with_fallback(parse_fallback(&v.fallback)?);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`VariableSpec`] from a variable table.
pub fn build_variable(v: &VariableToml) -> Result<VariableSpec> {
    let build = || -> Result<VariableSpec> {
        let adjustment = build_adjustment(v.add, v.mult)?;
        let obs_name = match (&v.obs_name, default_obs_name(&v.name)) {
            (Some(name), _) => name.clone(),
            (None, Some(name)) => name.to_string(),
            (None, None) => bail!("no obs_name given and no default for this variable"),
        };
        Ok(VariableSpec::new(
            VariableDescriptor::new(&v.name).with_adjustment(adjustment),
            obs_name,
            build_qm_config(v)?,
        ))
    };
    build().with_context(|| format!("variable '{}'", v.name))
}

/// Builds a [`GcmSpec`]; `HadGEM2` collapses duplicates unless configured
/// otherwise.
pub fn build_gcm(g: &GcmToml) -> GcmSpec {
    let (name, collapse) = match g {
        GcmToml::Name(name) => (name, None),
        GcmToml::Detailed(d) => (&d.name, d.collapse_duplicates),
    };
    let collapse = collapse.unwrap_or(name == DUPLICATING_GCM);
    GcmSpec::new(name).with_collapse_duplicates(collapse)
}

/// Builds an [`ExperimentSpec`].
pub fn build_experiment(e: &ExperimentToml) -> Result<ExperimentSpec> {
    let bounds = build_date_bounds(&e.time_bnds, &format!("time_bnds of experiment '{}'", e.name))?;
    Ok(ExperimentSpec::new(&e.name, bounds))
}

/// Builds and validates the full [`RunPlan`].
pub fn build_plan(config: &GcmqmConfig) -> Result<RunPlan> {
    let variables = config
        .variables
        .iter()
        .map(build_variable)
        .collect::<Result<Vec<_>>>()?;
    let experiments = config
        .experiments
        .iter()
        .map(build_experiment)
        .collect::<Result<Vec<_>>>()?;
    let gcms = config.gcms.iter().map(build_gcm).collect();

    let plan = RunPlan::new(
        build_bounds(config.lon_bnds, "lon_bnds")?,
        build_bounds(config.lat_bnds, "lat_bnds")?,
        variables,
        gcms,
        experiments,
    )
    .with_historical(&config.historical)
    .with_obs_time_bounds(build_date_bounds(&config.obs_time_bnds, "obs_time_bnds")?)
    .with_strict_alignment(config.strict_alignment);

    plan.validate()?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra_variable: &str) -> GcmqmConfig {
        let text = format!(
            r#"
lon_bnds = [60.0, 100.0]
lat_bnds = [5.0, 40.0]
gcms = ["CCSM4", "HadGEM2", {{ name = "MIROC5", collapse_duplicates = true }}]

[[variables]]
name = "tas"
add = -273.15
{extra_variable}

[[experiments]]
name = "hist"
time_bnds = ["1971-01-01", "2005-12-31"]

[[experiments]]
name = "rcp85"
time_bnds = ["2006-01-01", "2100-12-31"]
"#
        );
        toml::from_str(&text).unwrap()
    }

    fn error_text(cfg: &GcmqmConfig) -> String {
        format!("{:#}", build_plan(cfg).unwrap_err())
    }

    #[test]
    fn builds_valid_plan() {
        let plan = build_plan(&config("")).unwrap();
        let v = &plan.variables()[0];
        assert_eq!(v.obs_name(), "tave");
        assert_eq!(v.descriptor().adjustment(), Adjustment::Add(-273.15));
        assert_eq!(plan.experiments().len(), 2);
        assert_eq!(plan.historical(), "hist");
    }

    #[test]
    fn hadgem_collapses_by_default() {
        let plan = build_plan(&config("")).unwrap();
        let flags: Vec<bool> = plan.gcms().iter().map(|g| g.collapse_duplicates()).collect();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn hadgem_flag_can_be_disabled() {
        let g = GcmToml::Detailed(GcmDetailToml {
            name: "HadGEM2".to_string(),
            collapse_duplicates: Some(false),
        });
        assert!(!build_gcm(&g).collapse_duplicates());
    }

    #[test]
    fn add_and_mult_conflict() {
        let cfg = config("mult = 2.0");
        assert!(error_text(&cfg).contains("only one of add or mult"));
    }

    #[test]
    fn unknown_method_rejected() {
        let cfg = config(r#"method = "kernel""#);
        assert!(error_text(&cfg).contains("unknown method"));
    }

    #[test]
    fn gamma_needs_wet_day() {
        let cfg = config(r#"method = "gamma""#);
        assert!(error_text(&cfg).contains("variable 'tas'"));
        let cfg = config("method = \"gamma\"\nwet_day = 0.1");
        assert!(build_plan(&cfg).is_ok());
    }

    #[test]
    fn unknown_variable_needs_obs_name() {
        let mut cfg = config("");
        cfg.variables[0].name = "huss".to_string();
        assert!(error_text(&cfg).contains("no obs_name"));
    }

    #[test]
    fn variable_without_metadata_rejected() {
        let mut cfg = config(r#"obs_name = "q""#);
        cfg.variables[0].name = "huss".to_string();
        assert!(error_text(&cfg).contains("no output metadata"));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let mut cfg = config("");
        cfg.lat_bnds = [40.0, 5.0];
        assert!(error_text(&cfg).contains("lat_bnds"));
    }

    #[test]
    fn bad_dates_rejected() {
        let mut cfg = config("");
        cfg.experiments[1].time_bnds[0] = "2006-13-01".to_string();
        assert!(error_text(&cfg).contains("rcp85"));
        let mut cfg = config("");
        cfg.obs_time_bnds = ["2000-01-01".to_string(), "1999-01-01".to_string()];
        assert!(error_text(&cfg).contains("obs_time_bnds"));
    }

    #[test]
    fn historical_must_exist() {
        let mut cfg = config("");
        cfg.historical = "historical".to_string();
        assert!(error_text(&cfg).contains("calibrate"));
    }

    #[test]
    fn qstep_range_checked() {
        let cfg = config("qstep = 0.75");
        assert!(error_text(&cfg).contains("qstep"));
    }
}
