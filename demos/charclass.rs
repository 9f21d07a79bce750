//! Compile character classes into a bit-vector alphabet.
//!
//! Each class is a comma-separated list of ranges, where a bound is either a
//! single character or a hex code point:
//!
//! ```bash
//! cargo run --example charclass -- 'a-z,A-Z' '0-9' '_' '0x391-0x3C9'
//! ```

use alphabet_bdd::bdd::Bdd;
use alphabet_bdd::bv_algebra::BvAlgebra;
use alphabet_bdd::reference::Ref;
use clap::Parser;
use color_eyre::eyre::{bail, eyre};
use log::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Compile character classes into minterms")]
struct Cli {
    /// Character classes, e.g. 'a-z,A-Z'
    #[arg(required = true)]
    classes: Vec<String>,

    /// Highest bit of an element (15 for UTF-16 code units)
    #[arg(long, default_value = "15")]
    max_bit: i32,

    /// Show debug logs
    #[arg(short, long)]
    verbose: bool,
}

fn parse_bound(s: &str) -> color_eyre::Result<u64> {
    if let Some(hex) = s.strip_prefix("0x") {
        return Ok(u64::from_str_radix(hex, 16)?);
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u64),
        _ => bail!("bad bound {:?}", s),
    }
}

fn parse_class(bdd: &Bdd, class: &str, max_bit: i32) -> color_eyre::Result<Ref> {
    let mut res = Ref::FALSE;
    for part in class.split(',') {
        // a lone '-' is a character, not a range
        let (lo, hi) = match part.char_indices().skip(1).find(|&(_, c)| c == '-') {
            Some((i, _)) => (parse_bound(&part[..i])?, parse_bound(&part[i + 1..])?),
            None => {
                let v = parse_bound(part)?;
                (v, v)
            }
        };
        let range = bdd.mk_range(lo, hi, max_bit)?;
        res = bdd.apply_or(res, range)?;
    }
    Ok(res)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let bdd = Bdd::default();
    let preds = cli
        .classes
        .iter()
        .map(|class| parse_class(&bdd, class, cli.max_bit))
        .collect::<color_eyre::Result<Vec<_>>>()?;
    for (class, &p) in cli.classes.iter().zip(&preds) {
        println!("{:>16} = {}", class, bdd.pretty_print(p, cli.max_bit)?);
    }

    let minterms = bdd.generate_minterms(&preds)?;
    println!("\n{} minterms:", minterms.len());
    for (i, m) in minterms.iter().enumerate() {
        let mask: String = m.characteristic.iter().map(|&b| if b { '1' } else { '0' }).collect();
        println!(
            "  #{:<3} {}  size {:>6}  {}",
            i,
            mask,
            bdd.domain_size(m.pred, cli.max_bit)?,
            bdd.pretty_print(m.pred, cli.max_bit)?
        );
    }

    let partition: Vec<Ref> = minterms.iter().map(|m| m.pred).collect();
    let alg = BvAlgebra::new(&bdd, &partition, cli.max_bit)?;
    println!("\nCompiled into {} bits:", alg.width());
    for (class, &p) in cli.classes.iter().zip(&preds) {
        let bv = alg.convert_from_charset(&bdd, p)?;
        if alg.domain_size(&bv) != bdd.domain_size(p, cli.max_bit)? {
            return Err(eyre!("class {:?} is not a union of minterms", class));
        }
        println!(
            "{:>16} = {}  size {}",
            class,
            alg.pretty_print_bits(&bv),
            alg.domain_size(&bv)
        );
    }

    info!("bdd = {:?}", bdd);
    info!("cache = {:?}", bdd.cache_stats());
    Ok(())
}
