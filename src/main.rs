use clap::Parser;
use dmr_core::transport::homebrew::{Homebrew, HomebrewConfig};
use dmr_core::transport::mmdvm::{Mmdvm, MmdvmModel};
use dmr_core::{init_logger, log_info, reactor, repeater::AllowAll, DmrError, RepeaterCore, Transport};

/// Bridges a Homebrew (IP Site Connect) master to an MMDVM hotspot modem
/// through the repeater core.
#[derive(Parser)]
#[command(name = "dmr-repeater")]
#[command(about = "Bridges a Homebrew master and an MMDVM modem")]
struct Cli {
    /// Repeater ID, e.g. 312000.
    #[arg(long)]
    repeater_id: u32,

    /// Homebrew shared secret.
    #[arg(long)]
    secret: String,

    /// Homebrew master host:port.
    #[arg(long)]
    master: String,

    /// MMDVM serial device, e.g. /dev/ttyACM0.
    #[arg(long)]
    serial_port: String,

    /// MMDVM serial baud rate.
    #[arg(long, default_value_t = 115200)]
    baud: u32,

    /// Repeater color code (1-15).
    #[arg(long, default_value_t = 1)]
    color_code: u8,
}

#[tokio::main]
async fn main() -> Result<(), DmrError> {
    init_logger();

    let cli = Cli::parse();
    let peer_addr = tokio::net::lookup_host(&cli.master)
        .await
        .map_err(|e| DmrError::InvalidArgument(format!("resolve {}: {e}", cli.master)))?
        .next()
        .ok_or_else(|| DmrError::InvalidArgument(format!("no address for {}", cli.master)))?;

    let mut config = HomebrewConfig::default();
    config.repeater_id = cli.repeater_id;
    config.color_code = cli.color_code;

    let mut homebrew = Homebrew::new(config, peer_addr).await?;
    homebrew.auth(cli.secret).await?;
    log_info("Homebrew login initiated");

    let mut mmdvm = Mmdvm::new(&cli.serial_port, cli.baud, MmdvmModel::G4klx, cli.color_code).await?;
    mmdvm.start().await?;
    log_info("MMDVM modem started");

    let transports: Vec<Box<dyn Transport>> = vec![Box::new(homebrew), Box::new(mmdvm)];
    let core = RepeaterCore::new(cli.color_code, Box::new(AllowAll));

    reactor::run(transports, core).await
}
