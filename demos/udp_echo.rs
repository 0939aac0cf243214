//! Echo service on UDP port 7 over a TAP interface.
//!
//! Needs CAP_NET_ADMIN. From the host, `ping 10.0.0.2` exercises ICMP and
//! `nc -u 10.0.0.2 7` the echo service.

mod utils;

use std::thread;
use std::time::Duration;

use anyhow::Context;
use toy_netstack::{MacAddr, NetStack, StackConfig, TapDevice};
use tracing_subscriber::EnvFilter;
use utils::network::configure_interface;

const ECHO_PORT: u16 = 7;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let tap_name = "tap0";
    let device = TapDevice::open(tap_name).with_context(|| format!("opening {tap_name}"))?;
    configure_interface(tap_name, "10.0.0.1/24").context("configuring host side")?;

    let config = StackConfig::new(
        MacAddr::new(0x02, 0x00, 0x00, 0x00, 0x00, 0x02),
        "10.0.0.2".parse()?,
    );
    let mut stack = NetStack::new(config, device)?;
    stack.udp_bind(ECHO_PORT, |stack, payload, src_ip, src_port| {
        if let Err(e) = stack.udp_send(ECHO_PORT, src_ip, src_port, payload) {
            tracing::warn!(%src_ip, src_port, error = %e, "echo failed");
        }
    })?;

    loop {
        if stack.run_until_idle() == 0 {
            thread::sleep(Duration::from_millis(5));
        }
    }
}
