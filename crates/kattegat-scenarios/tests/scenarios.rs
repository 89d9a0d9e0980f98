use std::fs;

use kattegat_algo::{OpfError, OpfMethod, OpfSolver};
use kattegat_scenarios::{
    load_spec_from_path, resolve_scenarios, run_model, run_scenarios, ModelParams, ParamField,
};
use tempfile::tempdir;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn reference_case_result_set() {
    let result = run_model(&ModelParams::default(), &OpfSolver::new()).unwrap();

    assert_eq!(result.method(), OpfMethod::DcOpf);
    assert!(close(result.total_cost(), 3250.0));
    assert!(close(result.dispatch()["wind_Copenhagen"], 100.0));
    assert!(close(result.dispatch()["solar_Aarhus"], 50.0));
    assert!(close(result.dispatch()["gas_Aalborg"], 0.0));
    assert!(close(result.total_generation(), 150.0));

    assert_eq!(result.line_flows().len(), 3);
    assert!(close(result.line_flows()["Copenhagen_Aarhus"], 22.2222));
    assert!(close(result.line_flows()["Aarhus_Aalborg"], 22.2222));
    assert!(close(result.line_flows()["Aalborg_Copenhagen"], -27.7778));
    assert_eq!(result.bus_coordinates().len(), 3);
}

#[test]
fn repeated_runs_are_identical() {
    let solver = OpfSolver::new();
    let params = ModelParams::default();
    let a = run_model(&params, &solver).unwrap();
    let b = run_model(&params, &solver).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn invalid_params_never_reach_the_solver() {
    let mut params = ModelParams::default();
    params.cost[0] = -1.0;
    let err = run_model(&params, &OpfSolver::new()).unwrap_err();
    assert!(matches!(err, OpfError::InvalidInput(ref m) if m.contains("cost.wind")));
}

#[test]
fn shortfall_is_infeasible() {
    let mut params = ModelParams::default();
    let demand: ParamField = "demand.copenhagen".parse().unwrap();
    params.set(demand, 400.0).unwrap();
    let err = run_model(&params, &OpfSolver::new()).unwrap_err();
    assert!(matches!(err, OpfError::Infeasible(_)), "{err}");
}

#[test]
fn congested_lines_are_infeasible_not_a_solver_failure() {
    // Capacity covers demand, but the two paths into Copenhagen carry at
    // most 180 MW.
    let params = ModelParams {
        demand: [300.0, 0.0, 0.0],
        capacity: [0.0, 0.0, 300.0],
        ..ModelParams::default()
    };
    let err = run_model(&params, &OpfSolver::new()).unwrap_err();
    assert!(matches!(err, OpfError::Infeasible(_)), "{err:?}");
    assert_eq!(err.category(), "infeasible");
}

#[test]
fn yaml_file_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("what_if.yaml");
    fs::write(
        &path,
        r#"
version: 1
scenarios:
  - scenario_id: base
  - scenario_id: gas_out
    outages:
      - type: gen
        id: gas_Aalborg
  - scenario_id: cheap_gas
    overrides:
      cost.gas: 10
"#,
    )
    .unwrap();

    let set = load_spec_from_path(&path).unwrap();
    let resolved = resolve_scenarios(&set).unwrap();
    let outcomes = run_scenarios(&resolved, &OpfSolver::new());
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let gas_out = outcomes[1].result.as_ref().unwrap();
    assert!(close(gas_out.dispatch()["gas_Aalborg"], 0.0));
    assert!(close(gas_out.total_cost(), 3250.0));

    let cheap = outcomes[2].result.as_ref().unwrap();
    assert!(cheap.total_cost() < 3250.0);
}

#[test]
fn missing_file_has_context() {
    let err = load_spec_from_path(std::path::Path::new("/nonexistent/spec.yaml")).unwrap_err();
    assert!(err.to_string().contains("reading scenario spec"));
}
