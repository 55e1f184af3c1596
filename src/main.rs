//! Command-line front-end: generate the C source files of a white-box Speck
//! implementation for a given master key.

use {
    clap::{ArgEnum, Parser},
    log::debug,
    std::{fs, path::PathBuf, process},
    white_box_speck::{
        codegen::{
            bit_packed::BitPackedCodeGenerator,
            default::DefaultCodeGenerator,
            encodings::{InputEncodingCodeGenerator, OutputEncodingCodeGenerator},
            inlined::InlinedCodeGenerator,
            inlined_bit_packed::InlinedBitPackedCodeGenerator,
            simd::SimdCodeGenerator,
            sparse_matrix::SparseMatrixCodeGenerator,
            CodeGenerator,
        },
        equivalence::{
            affine::{Type1AffineSelfEquivalenceProvider, Type2AffineSelfEquivalenceProvider},
            combined::CombinedSelfEquivalenceProvider,
            linear::LinearSelfEquivalenceProvider,
            SelfEquivalenceProvider,
        },
        random_affine_external_encoding, random_linear_external_encoding, Params, WhiteBoxSpeck,
    },
};

#[derive(Clone, Copy, ArgEnum)]
enum SelfEquivalences {
    Affine,
    Linear,
}

/// Generate a white-box Speck implementation using self-equivalence
/// encodings.
#[derive(Parser)]
#[clap(name = "white-box-speck")]
struct Args {
    /// The key to use for the Speck implementation, a hexadecimal
    /// representation of the words.
    #[clap(required = true)]
    key: Vec<String>,

    /// The block size in bits of the Speck implementation.
    #[clap(long, default_value_t = 128)]
    block_size: usize,

    /// The key size in bits of the Speck implementation.
    #[clap(long, default_value_t = 256)]
    key_size: usize,

    /// The directory to output the C files to.
    #[clap(long, default_value = ".")]
    output_dir: PathBuf,

    /// The type of self-equivalences to use.
    #[clap(long, arg_enum, default_value = "affine")]
    self_equivalences: SelfEquivalences,

    /// Log debug messages.
    #[clap(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(error) = run(&args) {
        eprintln!("error: {error}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let params = Params::new(args.block_size, args.key_size)?;
    let key = args
        .key
        .iter()
        .map(|word| u64::from_str_radix(word.trim_start_matches("0x"), 16))
        .collect::<Result<Vec<u64>, _>>()?;
    let white_box = WhiteBoxSpeck::new(params, &key)?;
    let word_size = params.word_size;
    let mut rng = rand::thread_rng();

    debug!("generating random external encodings");
    let (provider, input_encoding, output_encoding): (Box<dyn SelfEquivalenceProvider>, _, _) =
        match args.self_equivalences {
            SelfEquivalences::Affine => (
                Box::new(CombinedSelfEquivalenceProvider::new(
                    word_size,
                    vec![
                        Box::new(Type1AffineSelfEquivalenceProvider::new(word_size)),
                        Box::new(Type2AffineSelfEquivalenceProvider::new(word_size)),
                    ],
                )),
                random_affine_external_encoding(word_size, &mut rng),
                random_affine_external_encoding(word_size, &mut rng),
            ),
            SelfEquivalences::Linear => (
                Box::new(LinearSelfEquivalenceProvider::new(word_size)),
                random_linear_external_encoding(word_size, &mut rng),
                random_linear_external_encoding(word_size, &mut rng),
            ),
        };

    debug!("generating matrices and vectors");
    let layers = white_box.affine_layers(&input_encoding, &output_encoding, &*provider, &mut rng);

    fs::create_dir_all(&args.output_dir)?;
    let write = |name: &str, contents: String| -> std::io::Result<()> {
        fs::write(args.output_dir.join(name), contents)
    };

    debug!("generating default code");
    write(
        "default_white_box_speck.c",
        DefaultCodeGenerator.generate_code(&layers.matrices, &layers.vectors),
    )?;

    debug!("generating sparse matrix code");
    write(
        "sparse_matrix_white_box_speck.c",
        SparseMatrixCodeGenerator.generate_code(&layers.matrices, &layers.vectors),
    )?;

    debug!("generating inlined code");
    write(
        "inlined_white_box_speck.c",
        InlinedCodeGenerator.generate_code(&layers.matrices, &layers.vectors),
    )?;

    debug!("generating bit-packed code");
    write(
        "bit_packed_white_box_speck.c",
        BitPackedCodeGenerator.generate_code(&layers.matrices, &layers.vectors),
    )?;

    debug!("generating inlined bit-packed code");
    write(
        "inlined_bit_packed_white_box_speck.c",
        InlinedBitPackedCodeGenerator.generate_code(&layers.matrices, &layers.vectors),
    )?;

    // The SIMD layout packs whole rows into 256-bit registers, which does
    // not work out for 24- and 48-bit words.
    if word_size != 24 && word_size != 48 {
        debug!("generating SIMD code");
        write(
            "simd_white_box_speck.c",
            SimdCodeGenerator.generate_code(&layers.matrices, &layers.vectors),
        )?;
    }

    debug!("generating external encodings code");
    write(
        "inverse_input_external_encoding.c",
        InputEncodingCodeGenerator.generate_inverse_program(
            &layers.matrices[0],
            &layers.vectors[0],
            &input_encoding,
        )?,
    )?;
    write(
        "inverse_output_external_encoding.c",
        OutputEncodingCodeGenerator.generate_inverse_program(&output_encoding)?,
    )?;

    debug!("done");
    Ok(())
}
