//! `relay actions` - print the action catalog.

use relay_core::Service;
use relay_core::action::catalog;
use std::io::Write;

pub fn list(out: &mut impl Write) -> std::io::Result<()> {
    let catalog = catalog();
    for service in [Service::Mail, Service::Calendar, Service::Drive] {
        writeln!(out, "{}:", service)?;
        for spec in catalog.iter().filter(|s| s.service == service) {
            writeln!(out, "  {:<18} {}", spec.name, spec.parameters)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
