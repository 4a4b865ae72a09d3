use crate::CapIdError;
use log::debug;
use mcu_model::{CapId, Process, Project};

/// Number every object of each process within its own capability table.
///
/// Order: threads, invocations, ports, receive endpoints, send endpoints,
/// each in declaration order, starting at 0. The count becomes the process'
/// capability-table frontier.
///
/// # Errors
/// [`CapIdError::TableOverflow`] if a process has more objects than a `u32`
/// can number.
pub fn assign_local_ids(project: &mut Project) -> Result<(), CapIdError> {
    for process in &mut project.processes {
        let frontier = number_process(process).ok_or_else(|| CapIdError::TableOverflow {
            process: process.name.clone(),
        })?;
        process.captbl_frontier = Some(frontier);
        debug!(
            "process '{}': {frontier} local capabilities, table size {}",
            process.name,
            frontier.saturating_add(process.extra_captbl)
        );
    }
    Ok(())
}

fn number_process(process: &mut Process) -> Option<u32> {
    let mut next = 0u32;
    let mut take = || {
        let id = CapId::new(next);
        next = next.checked_add(1)?;
        Some(id)
    };

    for thread in &mut process.threads {
        thread.local_id = Some(take()?);
    }
    for invocation in &mut process.invocations {
        invocation.local_id = Some(take()?);
    }
    for port in &mut process.ports {
        port.local_id = Some(take()?);
    }
    for endpoint in &mut process.receive_endpoints {
        endpoint.local_id = Some(take()?);
    }
    for endpoint in &mut process.send_endpoints {
        endpoint.local_id = Some(take()?);
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_model::{EndpointRole, Invocation, Port, ReceiveEndpoint, SendEndpoint, Thread};

    #[test]
    fn category_order_then_declaration_order() {
        let mut project = Project {
            processes: vec![
                Process::new("A")
                    .with_extra_captbl(3)
                    .with_send_endpoint(SendEndpoint::new("Out", "B", EndpointRole::Message))
                    .with_port(Port::new("Time", "B"))
                    .with_receive_endpoint(ReceiveEndpoint::new("In", EndpointRole::Message))
                    .with_invocation(Invocation::new("Get", "get", 0x100))
                    .with_thread(Thread::new("T0", "t0", 0x100, 1))
                    .with_thread(Thread::new("T1", "t1", 0x100, 1)),
                Process::new("Empty"),
            ],
            ..Project::default()
        };

        assign_local_ids(&mut project).unwrap();
        let a = &project.processes[0];
        let ids = [
            a.threads[0].local_id,
            a.threads[1].local_id,
            a.invocations[0].local_id,
            a.ports[0].local_id,
            a.receive_endpoints[0].local_id,
            a.send_endpoints[0].local_id,
        ];
        let expected: Vec<_> = (0..6).map(|i| Some(CapId::new(i))).collect();
        assert_eq!(ids.to_vec(), expected);
        assert_eq!(a.captbl_frontier, Some(6));
        assert_eq!(a.captbl_size(), Some(9));

        assert_eq!(project.processes[1].captbl_frontier, Some(0));
    }
}
