use std::cell::RefCell;

use dk_app::{
    AppError, EngineError, RunMode, RunOptions, RunProgressEvent, RunResults, RunStage, Session,
    SimulationEngine, STORAGE_PLUGIN, run_service,
};
use dk_project::{OutputDef, Project, StreamFormat};
use dk_results::{AssemblyOptions, FailurePolicy};
use dk_value::{Matrix, Value};
use serde_json::json;

struct FakeEngine {
    single: Option<Value>,
    batch: Option<Value>,
    seen: RefCell<Vec<(Project, Option<usize>)>>,
}

impl FakeEngine {
    fn new(single: Option<Value>, batch: Option<Value>) -> Self {
        Self {
            single,
            batch,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl SimulationEngine for FakeEngine {
    fn initialize(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn run(&self, project: &Project) -> Result<Option<Value>, EngineError> {
        self.seen.borrow_mut().push((project.clone(), None));
        Ok(self.single.clone())
    }

    fn run_batch(&self, project: &Project, threads: usize) -> Result<Option<Value>, EngineError> {
        self.seen.borrow_mut().push((project.clone(), Some(threads)));
        Ok(self.batch.clone())
    }
}

struct FailingEngine;

impl SimulationEngine for FailingEngine {
    fn initialize(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn run(&self, _project: &Project) -> Result<Option<Value>, EngineError> {
        Err(EngineError::Simulation("model diverged".to_string()))
    }

    fn run_batch(&self, _project: &Project, _threads: usize) -> Result<Option<Value>, EngineError> {
        Err(EngineError::Simulation("model diverged".to_string()))
    }
}

fn project() -> Project {
    let mut project = Project::new("queue", 10.0);
    project.outputs.push(OutputDef {
        name: "view1".to_string(),
        location: "/tmp/out".to_string(),
        format: StreamFormat::Distant,
        plugin: "file".to_string(),
        package: "vendor".to_string(),
        data: None,
    });
    project
}

fn result_set(header: &str, value: i64) -> Value {
    let grid = Matrix::from_row_vecs(
        2,
        vec![
            vec![Some(Value::from("time")), Some(Value::from(header))],
            vec![Some(Value::Double(0.0)), Some(Value::Integer(value))],
        ],
    )
    .unwrap();
    Value::map([("view1", Value::Matrix(grid))])
}

#[test]
fn session_routes_outputs_to_storage() {
    let session = Session::new(project(), FakeEngine::new(None, None)).unwrap();
    let output = &session.project().outputs[0];

    assert_eq!(output.plugin, STORAGE_PLUGIN);
    assert_eq!(output.format, StreamFormat::Local);
    assert!(output.location.is_empty());
    assert_eq!(output.data, None);
}

#[test]
fn single_run_assembles_tree_and_reports_progress() {
    let engine = FakeEngine::new(Some(result_set(",top:gen.out", 3)), None);
    let session = Session::new(project(), engine).unwrap();

    let mut stages = Vec::new();
    let mut record = |event: RunProgressEvent| stages.push(event.stage);
    let response =
        run_service::run(&session, RunMode::Single, &RunOptions::default(), Some(&mut record))
            .unwrap();

    assert_eq!(
        stages,
        vec![
            RunStage::PreparingProject,
            RunStage::RunningEngine,
            RunStage::AssemblingResults,
            RunStage::Completed,
        ]
    );
    assert_eq!(response.mode, RunMode::Single);
    assert_eq!(response.run_id.len(), 64);

    let node = response.results.into_node().unwrap();
    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        json!({ "view1": { "time": [0.0], "top": { "gen": { "out": [3] } } } })
    );

    let seen = session.engine().seen.borrow();
    let (handed, threads) = &seen[0];
    assert_eq!(*threads, None);
    assert_eq!(
        handed.outputs[0].data,
        Some(Value::map([("header", Value::from("top"))]))
    );
    assert_eq!(session.project().outputs[0].data, None);
}

#[test]
fn batch_run_hands_threads_to_engine() {
    let mut grid = Matrix::new(2, 1);
    grid.set(0, 0, Some(result_set(":a.x", 1))).unwrap();
    grid.set(1, 0, Some(result_set(":a.x", 2))).unwrap();
    let engine = FakeEngine::new(None, Some(Value::Matrix(grid)));
    let session = Session::new(project(), engine).unwrap();

    let options = RunOptions {
        threads: 4,
        ..RunOptions::default()
    };
    let response = run_service::run(&session, RunMode::Batch, &options, None).unwrap();

    let RunResults::Batch(batch) = response.results else {
        panic!("expected batch results");
    };
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[1].len(), 1);
    assert_eq!(
        serde_json::to_value(&batch[1][0]).unwrap(),
        json!({ "view1": { "time": [0.0], "a": { "x": [2] } } })
    );
    assert_eq!(session.engine().seen.borrow()[0].1, Some(4));
}

#[test]
fn batch_needs_a_thread() {
    let session = Session::new(project(), FakeEngine::new(None, None)).unwrap();
    let options = RunOptions {
        threads: 0,
        ..RunOptions::default()
    };
    let err = run_service::run(&session, RunMode::Batch, &options, None).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn engine_without_output_is_no_result() {
    let session = Session::new(project(), FakeEngine::new(None, None)).unwrap();
    let response =
        run_service::run(&session, RunMode::Single, &RunOptions::default(), None).unwrap();
    assert_eq!(response.results, RunResults::NoResult);
    assert!(response.results.into_node().is_none());
}

#[test]
fn column_policy_flows_from_run_options() {
    let engine = FakeEngine::new(Some(result_set("bad,header", 1)), None);
    let session = Session::new(project(), engine).unwrap();

    let strict = run_service::run(&session, RunMode::Single, &RunOptions::default(), None);
    assert!(matches!(strict, Err(AppError::Results(_))));

    let lenient = RunOptions {
        assembly: AssemblyOptions {
            on_column_error: FailurePolicy::Skip,
            ..AssemblyOptions::default()
        },
        ..RunOptions::default()
    };
    let response = run_service::run(&session, RunMode::Single, &lenient, None).unwrap();
    assert_eq!(
        serde_json::to_value(response.results.into_node().unwrap()).unwrap(),
        json!({ "view1": { "time": [0.0] } })
    );
}

#[test]
fn engine_failures_surface_as_app_errors() {
    let session = Session::new(project(), FailingEngine).unwrap();
    let err = run_service::run(&session, RunMode::Single, &RunOptions::default(), None).unwrap_err();
    assert!(matches!(err, AppError::Engine(_)));
}
