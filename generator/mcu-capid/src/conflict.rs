use crate::CapIdError;
use log::debug;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use mcu_model::{EndpointRole, KernelObject, Project, is_identifier};

/// Check every name of the project for validity and uniqueness.
///
/// Names compare case-insensitively. Processes are unique project-wide;
/// objects are unique per category within their process, with ports and send
/// endpoints keyed by `(name, target)`. Interrupt receive endpoints
/// additionally share one project-wide namespace, since each one owns a chip
/// vector. Send endpoints with the interrupt role only name such an endpoint,
/// so any number of them may point at the same vector and they stay out of
/// that namespace.
///
/// # Errors
/// The first invalid or clashing name, as a [`CapIdError`].
pub fn detect_conflicts(project: &Project) -> Result<(), CapIdError> {
    let mut processes: HashMap<String, &str> = HashMap::new();
    let mut interrupts: HashMap<String, (&str, &str)> = HashMap::new();

    for process in &project.processes {
        if !is_identifier(&process.name) {
            return Err(CapIdError::InvalidProcessName {
                name: process.name.clone(),
            });
        }
        match processes.entry(process.name.to_ascii_lowercase()) {
            Entry::Occupied(first) => {
                return Err(CapIdError::DuplicateProcess {
                    first: (*first.get()).to_owned(),
                    second: process.name.clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(process.name.as_str());
            }
        }

        check_unique(&process.name, &process.threads)?;
        check_unique(&process.name, &process.invocations)?;
        check_unique(&process.name, &process.ports)?;
        check_unique(&process.name, &process.receive_endpoints)?;
        check_unique(&process.name, &process.send_endpoints)?;

        for endpoint in &process.receive_endpoints {
            if endpoint.role != EndpointRole::Interrupt {
                continue;
            }
            match interrupts.entry(endpoint.name.to_ascii_lowercase()) {
                Entry::Occupied(first) => {
                    let (first, first_process) = *first.get();
                    return Err(CapIdError::DuplicateInterrupt {
                        first: first.to_owned(),
                        first_process: first_process.to_owned(),
                        second: endpoint.name.clone(),
                        second_process: process.name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert((endpoint.name.as_str(), process.name.as_str()));
                }
            }
        }
    }

    debug!(
        "names of {} processes and {} interrupt endpoints are unique",
        processes.len(),
        interrupts.len()
    );
    Ok(())
}

/// Validate and de-duplicate one category of objects within a process.
fn check_unique<T: KernelObject>(process: &str, objects: &[T]) -> Result<(), CapIdError> {
    let mut seen: HashMap<(String, Option<String>), &str> = HashMap::new();
    for object in objects {
        let name = object.name();
        if !is_identifier(name) {
            return Err(CapIdError::InvalidName {
                kind: T::KIND,
                name: name.to_owned(),
                process: process.to_owned(),
            });
        }
        if let Some(target) = object.target()
            && !is_identifier(target)
        {
            return Err(CapIdError::InvalidTarget {
                kind: T::KIND,
                name: name.to_owned(),
                process: process.to_owned(),
                target: target.to_owned(),
            });
        }

        let key = (
            name.to_ascii_lowercase(),
            object.target().map(str::to_ascii_lowercase),
        );
        match seen.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(name);
            }
            Entry::Occupied(first) => {
                let first = (*first.get()).to_owned();
                return Err(match object.target() {
                    None => CapIdError::Duplicate {
                        kind: T::KIND,
                        process: process.to_owned(),
                        first,
                        second: name.to_owned(),
                    },
                    Some(target) => CapIdError::DuplicateReference {
                        kind: T::KIND,
                        process: process.to_owned(),
                        first,
                        second: name.to_owned(),
                        target: target.to_owned(),
                    },
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_model::{Invocation, ObjectKind, Port, Process, ReceiveEndpoint, SendEndpoint, Thread};

    fn project(processes: Vec<Process>) -> Project {
        Project {
            processes,
            ..Project::default()
        }
    }

    #[test]
    fn same_name_in_different_categories_is_fine() {
        let p = project(vec![
            Process::new("A")
                .with_thread(Thread::new("Work", "a", 0x100, 1))
                .with_invocation(Invocation::new("Work", "b", 0x100))
                .with_receive_endpoint(ReceiveEndpoint::new("Work", EndpointRole::Message)),
            Process::new("B").with_thread(Thread::new("Work", "c", 0x100, 1)),
        ]);
        assert_eq!(detect_conflicts(&p), Ok(()));
    }

    #[test]
    fn duplicates_compare_case_insensitively() {
        let p = project(vec![Process::new("A")
            .with_thread(Thread::new("Worker", "a", 0x100, 1))
            .with_thread(Thread::new("WORKER", "b", 0x100, 1))]);
        assert_eq!(
            detect_conflicts(&p),
            Err(CapIdError::Duplicate {
                kind: ObjectKind::Thread,
                process: "A".into(),
                first: "Worker".into(),
                second: "WORKER".into(),
            })
        );

        let p = project(vec![Process::new("Srv"), Process::new("srv")]);
        assert_eq!(
            detect_conflicts(&p),
            Err(CapIdError::DuplicateProcess {
                first: "Srv".into(),
                second: "srv".into()
            })
        );
    }

    #[test]
    fn references_are_keyed_by_target() {
        let ok = project(vec![Process::new("A")
            .with_port(Port::new("Log", "B"))
            .with_port(Port::new("Log", "C"))
            .with_send_endpoint(SendEndpoint::new("Tx", "B", EndpointRole::Message))
            .with_send_endpoint(SendEndpoint::new("Tx", "C", EndpointRole::Message))]);
        assert_eq!(detect_conflicts(&ok), Ok(()));

        let clash = project(vec![Process::new("A")
            .with_port(Port::new("Log", "B"))
            .with_port(Port::new("log", "b"))]);
        assert_eq!(
            detect_conflicts(&clash),
            Err(CapIdError::DuplicateReference {
                kind: ObjectKind::Port,
                process: "A".into(),
                first: "Log".into(),
                second: "log".into(),
                target: "b".into(),
            })
        );
    }

    #[test]
    fn interrupt_names_are_project_wide() {
        let p = project(vec![
            Process::new("A")
                .with_receive_endpoint(ReceiveEndpoint::new("TIM2", EndpointRole::Interrupt)),
            Process::new("B")
                .with_receive_endpoint(ReceiveEndpoint::new("TIM2", EndpointRole::Message))
                .with_receive_endpoint(ReceiveEndpoint::new("tim2", EndpointRole::Interrupt)),
        ]);
        // Per-process uniqueness holds regardless of role.
        assert_eq!(
            detect_conflicts(&p),
            Err(CapIdError::Duplicate {
                kind: ObjectKind::ReceiveEndpoint,
                process: "B".into(),
                first: "TIM2".into(),
                second: "tim2".into(),
            })
        );

        let p = project(vec![
            Process::new("A")
                .with_receive_endpoint(ReceiveEndpoint::new("TIM2", EndpointRole::Interrupt)),
            Process::new("B")
                .with_receive_endpoint(ReceiveEndpoint::new("Tim2", EndpointRole::Interrupt)),
        ]);
        assert_eq!(
            detect_conflicts(&p),
            Err(CapIdError::DuplicateInterrupt {
                first: "TIM2".into(),
                first_process: "A".into(),
                second: "Tim2".into(),
                second_process: "B".into(),
            })
        );
    }

    #[test]
    fn interrupt_senders_may_share_a_vector() {
        let p = project(vec![
            Process::new("Drv")
                .with_receive_endpoint(ReceiveEndpoint::new("TIM2", EndpointRole::Interrupt)),
            Process::new("A")
                .with_send_endpoint(SendEndpoint::new("TIM2", "Drv", EndpointRole::Interrupt)),
            Process::new("B")
                .with_send_endpoint(SendEndpoint::new("tim2", "Drv", EndpointRole::Interrupt)),
        ]);
        assert_eq!(detect_conflicts(&p), Ok(()));
    }

    #[test]
    fn invalid_identifiers() {
        let p = project(vec![Process::new("1st")]);
        assert!(matches!(
            detect_conflicts(&p),
            Err(CapIdError::InvalidProcessName { .. })
        ));

        let p = project(vec![
            Process::new("A").with_invocation(Invocation::new("get-time", "x", 0x100)),
        ]);
        assert!(matches!(
            detect_conflicts(&p),
            Err(CapIdError::InvalidName {
                kind: ObjectKind::Invocation,
                ..
            })
        ));

        let p = project(vec![Process::new("A").with_port(Port::new("Log", "9lives"))]);
        assert!(matches!(
            detect_conflicts(&p),
            Err(CapIdError::InvalidTarget { .. })
        ));
    }
}
