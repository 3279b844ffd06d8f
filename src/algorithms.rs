//! Shipped analytic graphs.
//!
//! Each constructor takes its head source graph(s) plus the column names it
//! should read and write, and returns the composed [`Graph`]. Intermediate
//! columns live in the crate-internal namespace below; pick different user
//! columns if they clash.

use crate::graph::Graph;
use crate::mappers::{
    Filter, HaversineDistance, LogRatio, Lowercase, ParseTimestamp, Product, Project, Split,
    StripPunctuation, TimeDiff,
};
use crate::ops::{InnerJoiner, RightJoiner, SortSpec};
use crate::record::Value;
use crate::reducers::{Count, First, MeanSpeed, TermFrequency, TopN};

/// Count how often every word occurs across the corpus.
///
/// Output rows hold the word and its total count, sorted by
/// `(count, word)`.
pub fn word_count_graph(source: Graph, text_column: &str, count_column: &str) -> Graph {
    source
        .map(StripPunctuation::new(text_column))
        .map(Lowercase::new(text_column))
        .map(Split::new(text_column))
        .sort(&[text_column])
        .reduce(Count::new(count_column), &[text_column])
        .sort(&[count_column, text_column])
}

/// TF-IDF per word/document pair, keeping the three best documents per
/// word.
///
/// IDF counts a document once per input row, matching the row-oriented
/// corpus the engine reads.
pub fn inverted_index_graph(
    source: Graph,
    doc_column: &str,
    text_column: &str,
    result_column: &str,
) -> Graph {
    const DOCS_TOTAL: &str = "docs_total";
    const DOCS_WITH_WORD: &str = "docs_with_word";
    const TF: &str = "tf";
    const IDF: &str = "idf";

    let split_words = source
        .map(StripPunctuation::new(text_column))
        .map(Lowercase::new(text_column))
        .map(Split::new(text_column));

    let doc_count = source.reduce(Count::new(DOCS_TOTAL), &[]);

    let idf = split_words
        .sort(&[doc_column, text_column])
        .reduce(First, &[doc_column, text_column])
        .sort(&[text_column])
        .reduce(Count::new(DOCS_WITH_WORD), &[text_column])
        .join(InnerJoiner::new(), &doc_count, &[])
        .map(LogRatio::new(DOCS_TOTAL, DOCS_WITH_WORD, IDF));

    split_words
        .sort(&[doc_column])
        .reduce(TermFrequency::new(text_column, TF), &[doc_column])
        .sort(&[text_column])
        .join(InnerJoiner::new(), &idf, &[text_column])
        .map(Product::new(&[TF, IDF], result_column))
        .map(Project::new(&[doc_column, text_column, result_column]))
        .sort_with(SortSpec::by(&[text_column, result_column]).descending())
        .reduce(TopN::new(result_column, 3), &[text_column])
        .sort(&[doc_column, text_column])
}

/// Top-3 words per document ranked by pointwise mutual information.
///
/// Words shorter than five characters or occurring fewer than twice in a
/// document are excluded before ranking.
pub fn pmi_graph(
    source: Graph,
    doc_column: &str,
    text_column: &str,
    result_column: &str,
) -> Graph {
    const WORD_IN_DOC: &str = "word_in_doc";
    const DOC_FREQUENCY: &str = "doc_frequency";
    const CORPUS_FREQUENCY: &str = "corpus_frequency";

    let split_words = source
        .map(StripPunctuation::new(text_column))
        .map(Lowercase::new(text_column))
        .map(Split::new(text_column))
        .sort(&[doc_column, text_column]);

    let long_word = {
        let text_column = text_column.to_owned();
        Filter::new(move |row| {
            row.get(&text_column)
                .and_then(Value::as_str)
                .is_some_and(|word| word.chars().count() > 4)
        })
    };
    let recurring = {
        let count_column = WORD_IN_DOC.to_owned();
        Filter::new(move |row| {
            row.get(&count_column)
                .and_then(Value::as_f64)
                .is_some_and(|count| count >= 2.0)
        })
    };
    let eligible_words = split_words
        .map(long_word)
        .sort(&[doc_column, text_column])
        .reduce(Count::new(WORD_IN_DOC), &[doc_column, text_column])
        .map(recurring)
        .map(Project::new(&[doc_column, text_column]));

    // Right join restores one row per surviving occurrence.
    let occurrences = split_words.join(
        RightJoiner::new(),
        &eligible_words,
        &[doc_column, text_column],
    );

    let corpus_frequency = occurrences
        .sort(&[text_column])
        .reduce(TermFrequency::new(text_column, CORPUS_FREQUENCY), &[])
        .map(Project::new(&[text_column, CORPUS_FREQUENCY]));

    let doc_frequency = occurrences
        .sort(&[doc_column, text_column])
        .reduce(TermFrequency::new(text_column, DOC_FREQUENCY), &[doc_column])
        .sort(&[text_column]);

    doc_frequency
        .join(InnerJoiner::new(), &corpus_frequency, &[text_column])
        .map(LogRatio::new(DOC_FREQUENCY, CORPUS_FREQUENCY, result_column))
        .sort_with(SortSpec::by(&[doc_column, result_column]).descending())
        .reduce(TopN::new(result_column, 3), &[doc_column])
        .sort(&[doc_column])
        .map(Project::new(&[doc_column, text_column, result_column]))
        .sort_with(SortSpec::by(&[result_column]).descending().per_group(&[doc_column]))
}

/// Column bindings for [`mean_speed_graph`].
#[derive(Clone, Debug)]
pub struct SpeedColumns {
    pub enter_time: String,
    pub leave_time: String,
    pub edge_id: String,
    pub start: String,
    pub end: String,
    pub weekday: String,
    pub hour: String,
    pub speed: String,
}

impl Default for SpeedColumns {
    fn default() -> Self {
        Self {
            enter_time: "enter_time".into(),
            leave_time: "leave_time".into(),
            edge_id: "edge_id".into(),
            start: "start".into(),
            end: "end".into(),
            weekday: "weekday".into(),
            hour: "hour".into(),
            speed: "speed".into(),
        }
    }
}

/// Average speed in km/h per weekday and hour.
///
/// `time_source` rows carry edge traversal timestamps; `length_source` rows
/// carry edge endpoint coordinates. Traversal distances come from the
/// haversine length of the edge, durations from the timestamp difference.
pub fn mean_speed_graph(time_source: Graph, length_source: Graph, columns: &SpeedColumns) -> Graph {
    const LENGTH_KM: &str = "length_km";
    const ELAPSED_HOURS: &str = "elapsed_hours";

    let lengths = length_source
        .map(HaversineDistance::new(
            LENGTH_KM,
            columns.start.as_str(),
            columns.end.as_str(),
        ))
        .map(Project::new(&[columns.edge_id.as_str(), LENGTH_KM]))
        .sort(&[columns.edge_id.as_str()]);

    let traversals = time_source
        .map(ParseTimestamp::new(
            columns.enter_time.as_str(),
            columns.weekday.as_str(),
            columns.hour.as_str(),
        ))
        .map(TimeDiff::new(
            ELAPSED_HOURS,
            columns.enter_time.as_str(),
            columns.leave_time.as_str(),
        ))
        .map(Project::new(&[
            columns.edge_id.as_str(),
            columns.weekday.as_str(),
            columns.hour.as_str(),
            ELAPSED_HOURS,
        ]))
        .sort(&[columns.edge_id.as_str()]);

    lengths
        .join(RightJoiner::new(), &traversals, &[columns.edge_id.as_str()])
        .sort(&[columns.weekday.as_str(), columns.hour.as_str()])
        .map(Project::new(&[
            columns.weekday.as_str(),
            columns.hour.as_str(),
            LENGTH_KM,
            ELAPSED_HOURS,
        ]))
        .reduce(
            MeanSpeed::new(columns.speed.as_str(), LENGTH_KM, ELAPSED_HOURS),
            &[columns.weekday.as_str(), columns.hour.as_str()],
        )
}
