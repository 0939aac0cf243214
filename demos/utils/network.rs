use std::io;
use std::process::Command;

use tracing::info;

fn ip(args: &[&str]) -> io::Result<()> {
    let status = Command::new("ip").args(args).status()?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("`ip {}` exited with {}", args.join(" "), status),
        ));
    }
    Ok(())
}

/// Give the host end of the TAP device an address and bring it up.
///
/// The stack itself uses a different address on the same subnet.
pub fn configure_interface(iface_name: &str, ip_cidr: &str) -> io::Result<()> {
    // ip addr add <ip_cidr> dev <iface_name>
    ip(&["addr", "add", ip_cidr, "dev", iface_name])?;
    // ip link set up dev <iface_name>
    ip(&["link", "set", "up", "dev", iface_name])?;

    info!(iface = iface_name, addr = ip_cidr, "host interface up");
    Ok(())
}
