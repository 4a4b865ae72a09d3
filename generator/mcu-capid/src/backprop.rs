use crate::CapIdError;
use log::debug;
use mcu_model::{CapId, Chip, EndpointRole, KernelObject, Process, Project};

/// Resolve every cross-reference to the global id of its target.
///
/// Ports resolve to an invocation, send endpoints to a receive endpoint of
/// the same role. Target processes match case-insensitively, target objects
/// by exact name. Interrupt endpoints are bound to the chip vector of the
/// same name.
///
/// Global ids must already be assigned.
///
/// # Errors
/// A [`CapIdError`] naming the first reference that does not resolve.
pub fn backpropagate(project: &mut Project, chip: &Chip) -> Result<(), CapIdError> {
    let mut resolved_ports = Vec::with_capacity(project.processes.len());
    let mut resolved_sends = Vec::with_capacity(project.processes.len());

    for process in &project.processes {
        let ports = process
            .ports
            .iter()
            .map(|port| {
                let target = find_target(project, process, port)?;
                if target.name.eq_ignore_ascii_case(&process.name) {
                    return Err(CapIdError::SelfTarget {
                        name: port.name.clone(),
                        process: process.name.clone(),
                    });
                }
                let invocation = target
                    .invocations
                    .iter()
                    .find(|i| i.name == port.name)
                    .ok_or_else(|| missing_object(process, port))?;
                global_id_of(target, invocation, invocation.global_id)
            })
            .collect::<Result<Vec<_>, _>>()?;
        resolved_ports.push(ports);

        let sends = process
            .send_endpoints
            .iter()
            .map(|send| {
                let target = find_target(project, process, send)?;
                let endpoint = target
                    .receive_endpoints
                    .iter()
                    .find(|r| r.name == send.name && r.role == send.role)
                    .ok_or_else(|| missing_object(process, send))?;
                global_id_of(target, endpoint, endpoint.global_id)
            })
            .collect::<Result<Vec<_>, _>>()?;
        resolved_sends.push(sends);
    }

    for ((process, ports), sends) in project
        .processes
        .iter_mut()
        .zip(resolved_ports)
        .zip(resolved_sends)
    {
        for (port, id) in process.ports.iter_mut().zip(ports) {
            debug!("'{}': port '{}' -> global {id}", process.name, port.name);
            port.target_global_id = Some(id);
        }
        for (send, id) in process.send_endpoints.iter_mut().zip(sends) {
            debug!("'{}': send endpoint '{}' -> global {id}", process.name, send.name);
            send.target_global_id = Some(id);
        }
    }

    bind_vectors(project, chip)
}

/// Record the interrupt number of every interrupt endpoint.
fn bind_vectors(project: &mut Project, chip: &Chip) -> Result<(), CapIdError> {
    for process in &mut project.processes {
        for endpoint in &mut process.receive_endpoints {
            if endpoint.role != EndpointRole::Interrupt {
                continue;
            }
            let vector = chip
                .vector(&endpoint.name)
                .ok_or_else(|| CapIdError::UnknownVector {
                    name: endpoint.name.clone(),
                    process: process.name.clone(),
                })?;
            endpoint.vector_number = Some(vector.number);
            debug!(
                "'{}': endpoint '{}' receives vector {}",
                process.name, endpoint.name, vector.number
            );
        }
    }
    Ok(())
}

fn find_target<'p, T: KernelObject>(
    project: &'p Project,
    owner: &Process,
    reference: &T,
) -> Result<&'p Process, CapIdError> {
    let target = reference.target().unwrap_or_default();
    project
        .process(target)
        .ok_or_else(|| CapIdError::TargetProcessMissing {
            kind: T::KIND,
            name: reference.name().to_owned(),
            process: owner.name.clone(),
            target: target.to_owned(),
        })
}

fn missing_object<T: KernelObject>(owner: &Process, reference: &T) -> CapIdError {
    CapIdError::TargetObjectMissing {
        kind: T::KIND,
        name: reference.name().to_owned(),
        process: owner.name.clone(),
        target: reference.target().unwrap_or_default().to_owned(),
    }
}

fn global_id_of<T: KernelObject>(
    owner: &Process,
    object: &T,
    id: Option<CapId>,
) -> Result<CapId, CapIdError> {
    id.ok_or_else(|| CapIdError::MissingGlobalId {
        kind: T::KIND,
        name: object.name().to_owned(),
        process: owner.name.clone(),
    })
}
