use clap::{App, Arg, ArgMatches, SubCommand};
use ringlog::{
    console::{self, ConsoleConfig},
    context, display,
    error::RingLogError,
    Event, LogStore, Result, Target,
};
use std::{
    io::{self, Write},
    net::IpAddr,
    str::FromStr,
    thread,
    time::Duration,
};

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("ringlog-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("In-process ring buffer event log demo tool")
        .subcommand(
            SubCommand::with_name("serve")
                .about("Run writer threads and serve the console until killed")
                .arg(
                    Arg::with_name("bind")
                        .short("b")
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address the console binds to")
                        .default_value("127.0.0.1")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("port")
                        .short("p")
                        .long("port")
                        .value_name("PORT")
                        .help("Console TCP port")
                        .default_value("50005")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("capacity")
                        .short("c")
                        .long("capacity")
                        .value_name("EVENTS")
                        .help("Events per buffer (0 means the maximum)")
                        .default_value("32")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("threads")
                        .short("t")
                        .long("threads")
                        .value_name("COUNT")
                        .help("Number of writer threads")
                        .default_value("2")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("interval")
                        .short("i")
                        .long("interval-ms")
                        .value_name("MILLIS")
                        .help("Delay between events of one writer")
                        .default_value("500")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("demo")
                .about("Write sample events and print the dump")
                .arg(
                    Arg::with_name("capacity")
                        .short("c")
                        .long("capacity")
                        .value_name("EVENTS")
                        .help("Events per buffer")
                        .default_value("10")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("count")
                        .short("n")
                        .long("count")
                        .value_name("COUNT")
                        .help("Number of plain messages to write")
                        .default_value("12")
                        .takes_value(true),
                ),
        )
        .subcommand(SubCommand::with_name("info").about("Show version and build information"))
        .get_matches();

    match matches.subcommand() {
        ("serve", Some(serve_matches)) => serve(serve_matches),
        ("demo", Some(demo_matches)) => demo(demo_matches),
        ("info", Some(_)) => show_info(),
        _ => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn parse_arg<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    matches
        .value_of(name)
        .ok_or_else(|| RingLogError::invalid_parameter(name, "Missing value"))?
        .parse()
        .map_err(|_| RingLogError::invalid_parameter(name, "Invalid value"))
}

fn serve(matches: &ArgMatches) -> Result<()> {
    let address: IpAddr = parse_arg(matches, "bind")?;
    let port: u16 = parse_arg(matches, "port")?;
    let capacity: usize = parse_arg(matches, "capacity")?;
    let threads: usize = parse_arg(matches, "threads")?;
    let interval = Duration::from_millis(parse_arg(matches, "interval")?);

    let store = ringlog::global();
    store.init(capacity)?;
    let extra = store.create_buffer(capacity)?;

    for worker in 0..threads {
        thread::Builder::new()
            .name(format!("writer-{}", worker))
            .spawn(move || write_forever(store, worker, extra, interval))
            .map_err(|e| RingLogError::from_io(e, "Failed to spawn writer thread"))?;
    }

    let config = ConsoleConfig::new().with_address(address).with_port(port);
    let handle = console::start(store, config)?;
    println!("Console listening on {}", handle.local_addr());
    println!("Connect with: nc {} {}", handle.local_addr().ip(), handle.local_addr().port());
    handle.join()
}

fn write_forever(store: &LogStore, worker: usize, extra: usize, interval: Duration) {
    context::set_thread_name(&format!("writer-{}", worker));
    let mut sequence = 0u64;
    loop {
        let message = format!("tick {}", sequence);
        let event = Event::new(&message)
            .with_function("write_forever")
            .with_line(line!());
        let target = if sequence % 5 == 0 {
            Target::Buffer(extra)
        } else {
            Target::Default
        };
        if let Err(err) = store.log_event(target, event) {
            log::debug!("writer-{} dropped event: {}", worker, err);
        }
        if sequence % 16 == 0 {
            let bytes = sequence.to_le_bytes();
            if let Err(err) = store.log_hex(Target::Buffer(extra), "sequence bytes", &bytes) {
                log::debug!("writer-{} dropped hex dump: {}", worker, err);
            }
        }
        sequence = sequence.wrapping_add(1);
        thread::sleep(interval);
    }
}

fn checksum_renderer(out: &mut dyn Write, payload: &[u8]) -> io::Result<()> {
    let sum = payload.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));
    write!(out, "\t{} bytes, checksum {:#010x}", payload.len(), sum)
}

fn demo(matches: &ArgMatches) -> Result<()> {
    let capacity: usize = parse_arg(matches, "capacity")?;
    let count: usize = parse_arg(matches, "count")?;

    let store = LogStore::new();
    store.init(capacity)?;
    context::set_thread_name("demo");

    for i in 0..count {
        store.log(&format!("m{}", i))?;
    }

    let checksum = store.register_fn("checksum", checksum_renderer)?;
    let payload: Vec<u8> = (0u8..16).collect();
    {
        let _scope = context::enter_scope();
        store.log_event(
            Target::Default,
            Event::new("custom payload")
                .with_function("demo")
                .with_line(line!())
                .with_payload(checksum, &payload),
        )?;
        store.log_hex(Target::Default, "hex payload", &payload)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    display::write_all_buffers(&mut out, &store, true, true)?;
    out.flush()?;

    store.cleanup()
}

fn show_info() -> Result<()> {
    println!("ringlog v{}", ringlog::VERSION);
    println!("In-process ring buffer event log");
    println!();
    println!("Limits:");
    println!("  Buffers per store     : {}", ringlog::config::MAX_BUFFERS);
    println!("  Events per buffer     : {}", ringlog::config::MAX_EVENTS);
    println!("  Message bytes         : {}", ringlog::config::MESSAGE_CAPACITY - 1);
    println!("  Renderer entries      : {}", ringlog::config::RENDERER_CAPACITY);
    println!("  Default console port  : {}", ringlog::config::DEFAULT_CONSOLE_PORT);
    Ok(())
}
