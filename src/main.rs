use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use orbit_sim::body::Body;
use orbit_sim::engine::{single, threaded};
use orbit_sim::file;
use orbit_sim::frame;
use orbit_sim::sink::BodyFileSinks;

#[derive(Debug, Parser)]
#[command(version, about = "N-body gravity simulator with RK4 integration")]
struct Args {
    /// Initial-conditions file to simulate.
    #[arg(short, long, default_value = "InitialConditions.ini")]
    input: PathBuf,

    /// Run one worker thread per body instead of a single thread.
    #[arg(short, long)]
    multithreaded: bool,

    /// Write a sample initial-conditions file to the input path and exit.
    #[arg(long)]
    generate_sample: bool,

    /// Directory receiving one <body name>.csv trajectory file per body.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.generate_sample {
        file::write_sample_file(&args.input)?;
        println!("Sample file {} has been created.", args.input.display());
        return Ok(());
    }

    let mut scenario = file::read_scenario(&args.input)?;

    frame::recenter_on_barycenter(&mut scenario.bodies);
    print_summary(&scenario.bodies);
    frame::premultiply_gravity(&mut scenario.bodies);

    let names: Vec<String> = scenario.bodies.iter().map(|b| b.name.clone()).collect();
    let sinks = BodyFileSinks::create(&args.output_dir, &names)?;

    eprintln!("Beginning simulation. This may take some time, please wait.");
    let start = Instant::now();

    let mut final_bodies;
    if args.multithreaded {
        final_bodies = threaded::run(scenario.bodies, scenario.days, sinks.into_per_body())?;
    } else {
        final_bodies = scenario.bodies;
        let mut sinks = sinks;
        single::run(&mut final_bodies, scenario.days, &mut sinks)?;
    }

    // Undo the G folding so the closing summary shows real positions next to
    // recognizable masses.
    for body in &mut final_bodies {
        body.mass /= orbit_sim::consts::GRAV_CONST;
    }
    print_summary(&final_bodies);

    let elapsed = start.elapsed();
    eprintln!("Simulation complete in {:.3} seconds.", elapsed.as_secs_f64());

    Ok(())
}

fn print_summary(bodies: &[Body]) {
    println!("\n\t=============== Object Properties ===============");
    for body in bodies {
        println!(
            "\t{}'s position is ({:.3e}, {:.3e}, {:.3e}) m",
            body.name, body.position.x, body.position.y, body.position.z
        );
        println!(
            "\t{}'s velocity is ({:.3e}, {:.3e}, {:.3e}) m/s",
            body.name, body.velocity.x, body.velocity.y, body.velocity.z
        );
    }
    println!("\t=================================================");
}
