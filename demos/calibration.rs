use npz_store::bridge::{read_array, read_scalar_attribute, write_array, write_scalar_attribute_as};
use npz_store::util::hex;
use npz_store::{Compression, File, TypeTag};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=npz_store=debug shows each dataset and attribute.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let path = "calibration.npz";
    let file = File::create(path)?;
    file.set_compression(Compression::Deflated)?;

    let board = file.create_group("boards/0")?;
    write_scalar_attribute_as("serial", &0x2a17u32, &board, TypeTag::STD_U32BE)?;
    let gains: Vec<f64> = (0..16).map(|ch| 1.0 + 0.01 * ch as f64).collect();
    write_array(&gains, &board, "gains", "gains")?;
    file.close()?;

    let file = File::open(path)?;
    let board = file.group("boards/0")?;
    let serial: u32 = read_scalar_attribute("serial", &board)?;
    let gains: Vec<f64> = read_array(&board, "gains")?;
    println!("board {} has {} channels", hex::<8, _>(serial), gains.len());
    println!("shape on disk: {:?}", board.dataset("gains")?.shape());
    Ok(())
}
