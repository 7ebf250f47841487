//! StartTransientUnit property encoding

use zbus::zvariant::Value;

use crate::manager::{ManagerError, TransientProperties};

/// Build the `a(sv)` property list for a transient service
///
/// ExecStart is `a(sasb)`: program path, full argv, ignore-failure flag.
pub fn transient_properties(
    name: &str,
    props: &TransientProperties,
) -> Result<Vec<(&'static str, Value<'static>)>, ManagerError> {
    let program = props
        .program()
        .ok_or_else(|| ManagerError::EmptyCommand(name.to_string()))?;

    let exec_start = vec![(
        program.to_string(),
        props.exec_start.clone(),
        props.ignore_failure,
    )];

    Ok(vec![
        ("Description", Value::from(props.description.clone())),
        ("ExecStart", Value::from(exec_start)),
    ])
}
