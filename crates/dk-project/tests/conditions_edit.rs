use dk_project::{Project, ProjectError, StreamFormat};
use dk_value::{Value, ValueType};

fn project_with_condition() -> Project {
    let mut project = Project::new("p", 10.0);
    project.condition_create("cond").unwrap();
    project
}

#[test]
fn create_and_list_conditions() {
    let mut project = project_with_condition();
    project.condition_create("other").unwrap();

    assert_eq!(project.condition_list(), vec!["cond", "other"]);
    assert!(matches!(
        project.condition_create("cond"),
        Err(ProjectError::DuplicateCondition { .. })
    ));
}

#[test]
fn add_value_creates_port_and_appends() {
    let mut project = project_with_condition();
    project.condition_add_real("cond", "x", 1.5).unwrap();
    project.condition_add_integer("cond", "x", 3).unwrap();
    project.condition_add_boolean("cond", "flag", true).unwrap();
    project.condition_add_string("cond", "name", "abc").unwrap();

    assert_eq!(
        project.condition_port_list("cond").unwrap(),
        vec!["x", "flag", "name"]
    );
    assert_eq!(
        project.condition_get_setvalue("cond", "x").unwrap(),
        &[Value::Double(1.5), Value::Integer(3)]
    );
    assert_eq!(
        project.condition_get_value_type("cond", "x", 1).unwrap(),
        ValueType::Integer
    );
    assert_eq!(
        project.condition_get_value("cond", "name", 0).unwrap(),
        &Value::from("abc")
    );
}

#[test]
fn set_and_delete_by_index() {
    let mut project = project_with_condition();
    project.condition_add_integer("cond", "x", 1).unwrap();
    project.condition_add_integer("cond", "x", 2).unwrap();

    project
        .condition_set_port_value("cond", "x", 0, Value::from("first"))
        .unwrap();
    let removed = project.condition_delete_value("cond", "x", 1).unwrap();

    assert_eq!(removed, Value::Integer(2));
    assert_eq!(
        project.condition_get_setvalue("cond", "x").unwrap(),
        &[Value::from("first")]
    );

    let err = project.condition_delete_value("cond", "x", 5).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::ValueIndexOob { index: 5, len: 1, .. }
    ));
}

#[test]
fn clear_keeps_port() {
    let mut project = project_with_condition();
    project.condition_add_real("cond", "x", 1.0).unwrap();
    project.condition_port_clear("cond", "x").unwrap();

    assert_eq!(project.condition_port_list("cond").unwrap(), vec!["x"]);
    assert!(project.condition_get_setvalue("cond", "x").unwrap().is_empty());
}

#[test]
fn missing_names_are_reported() {
    let mut project = project_with_condition();

    assert!(matches!(
        project.condition_port_list("nope"),
        Err(ProjectError::ConditionNotFound { .. })
    ));
    assert!(matches!(
        project.condition_get_setvalue("cond", "nope"),
        Err(ProjectError::PortNotFound { .. })
    ));
    assert!(matches!(
        project.condition_port_clear("cond", "nope"),
        Err(ProjectError::PortNotFound { .. })
    ));
    assert!(matches!(
        project.output_set_plugin("nope", "", StreamFormat::Local, "storage", "pkg"),
        Err(ProjectError::OutputNotFound { .. })
    ));
}

#[test]
fn experiment_bounds() {
    let mut project = project_with_condition();
    project.set_begin(5.0).unwrap();
    project.set_duration(20.0).unwrap();
    project.set_seed(9);

    assert_eq!(project.begin(), 5.0);
    assert_eq!(project.duration(), 20.0);
    assert_eq!(project.seed(), 9);

    assert!(project.set_duration(0.0).is_err());
    assert!(project.set_begin(f64::NAN).is_err());
    assert_eq!(project.duration(), 20.0);
    assert_eq!(project.begin(), 5.0);
}
