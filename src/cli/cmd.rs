extern crate clap;
extern crate stopwatch;

use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use self::clap::ArgMatches;
use self::stopwatch::Stopwatch;

use crate::cli::configuration::{self, RunConfig};
use crate::cli::logger;
use crate::core::conllx;
use crate::core::feature::{parse_template_file, AggregateGenerator};
use crate::core::guide::{self, HashingGuide, InMemoryModel};
use crate::core::sentence::Sentence;
use crate::core::transition::label::LabelNumberer;
use crate::core::transition::TransitionSystem;
use crate::core::util::thread_pool::ThreadPool;

type Guide = HashingGuide<AggregateGenerator, InMemoryModel>;

/// Loads the run configuration and every file it names, parses the input sentence
/// stream, dispatches one parse job per sentence across a worker pool sized by
/// `--threads`/`threads`, and writes the re-sequenced result back out in CoNLL-X form.
pub fn run(matches: &ArgMatches) {
    let mut sw = Stopwatch::start_new();

    let config_path = matches.value_of("config").unwrap();
    let input_path = matches.value_of("input").unwrap();

    logger::info(&format!("Loading run configuration {} ...", config_path));

    let run_config = match configuration::read_configuration(std::path::Path::new(config_path)) {
        Ok(run_config) => run_config,
        Err(err) => logger::fatal(&format!("Failed to load run configuration {}: {}", config_path, err)),
    };

    let guide = load_guide(&run_config);
    let system = run_config.transition_system.build();
    let system: Arc<dyn TransitionSystem + Send + Sync> = Arc::from(system);
    let guide = Arc::new(guide);

    let threads = thread_count(matches, &run_config);

    let sentences = read_input(input_path);
    let total = sentences.len();

    logger::info(&format!(
        "Parsing {} sentence(s) with {:?} using {} worker thread(s)",
        total, run_config.transition_system, threads,
    ));

    let results: Arc<Mutex<Vec<Option<Sentence>>>> =
        Arc::new(Mutex::new((0..total).map(|_| None).collect()));

    {
        let results = results.clone();
        let guide = guide.clone();
        let system = system.clone();

        let pool: ThreadPool<(usize, Sentence)> =
            ThreadPool::spawn(threads, threads * 2, move |(index, mut sentence)| {
                let handle = Rc::new(sentence.clone());
                match guide::parse(handle, system.as_ref(), guide.as_ref()) {
                    Ok(arcs) => sentence.apply_arcs(&arcs),
                    Err(err) => logger::err(&format!("sentence {}: {}", index + 1, err)),
                }
                results.lock().unwrap()[index] = Some(sentence);
            });

        for (index, sentence) in sentences.into_iter().enumerate() {
            pool.enqueue((index, sentence));
        }

        pool.terminate_and_join();
    }

    let finished = collect_results(results, total);
    write_output(&finished);

    sw.stop();
    logger::info(&format!("COMPLETE: {}ms : {} sentence(s) parsed", sw.elapsed_ms(), total));
}

fn thread_count(matches: &ArgMatches, run_config: &RunConfig) -> usize {
    match matches.value_of("threads") {
        None => run_config.threads.max(1),
        Some(threads) => match threads.parse::<usize>() {
            Ok(threads) if threads > 0 => threads,
            _ => {
                logger::err(&format!(
                    "Invalid number of threads: '{}'. Falling back to the configured value",
                    threads
                ));
                run_config.threads.max(1)
            }
        },
    }
}

fn load_guide(run_config: &RunConfig) -> Guide {
    let feature_text = read_to_string_or_fatal(&run_config.feature_file);
    let templates = match parse_template_file(&feature_text) {
        Ok(templates) => templates,
        Err(err) => logger::fatal(&format!(
            "Failed to parse feature templates in {}: {}",
            run_config.feature_file, err
        )),
    };
    let generator = AggregateGenerator::new(templates);

    let transitions_text = read_to_string_or_fatal(&run_config.transitions_file);
    let numberer = LabelNumberer::from_descriptors(transitions_text.lines());

    let model_text = read_to_string_or_fatal(&run_config.model_file);
    let model = match InMemoryModel::load(&model_text) {
        Ok(model) => model,
        Err(err) => logger::fatal(&format!("Failed to load model {}: {}", run_config.model_file, err)),
    };

    HashingGuide::new(generator, numberer, model, run_config.kernel_size)
}

fn read_to_string_or_fatal(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| logger::fatal(&format!("Could not read \"{}\": {}", path, err)))
}

/// Reads every sentence from `path`, or from stdin when `path` is `"-"`.
fn read_input(path: &str) -> Vec<Sentence> {
    let result = if path == "-" {
        let stdin = io::stdin();
        conllx::read_sentences(BufReader::new(stdin.lock()))
    } else {
        match fs::File::open(path) {
            Ok(file) => conllx::read_sentences(BufReader::new(file)),
            Err(err) => logger::fatal(&format!("Could not open input file \"{}\": {}", path, err)),
        }
    };

    result.unwrap_or_else(|err| logger::fatal(&format!("Failed to read CoNLL-X input from \"{}\": {}", path, err)))
}

fn collect_results(results: Arc<Mutex<Vec<Option<Sentence>>>>, total: usize) -> Vec<Sentence> {
    let slots = Arc::try_unwrap(results)
        .unwrap_or_else(|_| logger::fatal("worker pool left outstanding references to its result buffer"))
        .into_inner()
        .unwrap();

    slots
        .into_iter()
        .enumerate()
        .map(|(index, sentence)| {
            sentence.unwrap_or_else(|| {
                logger::fatal(&format!("missing parse result for sentence {} of {}", index + 1, total))
            })
        })
        .collect()
}

fn write_output(sentences: &[Sentence]) {
    let stdout = io::stdout();
    let handle = stdout.lock();
    if let Err(err) = conllx::write_sentences(BufWriter::new(handle), sentences) {
        logger::fatal(&format!("Failed to write output: {}", err));
    }
}
