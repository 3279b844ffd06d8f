//! Operator-level tests: mappers, reducers, sort, and join.

use rowflow::mappers::{
    Filter, HaversineDistance, LogRatio, Lowercase, ParseTimestamp, Product, Project, Split,
    StripPunctuation, TimeDiff,
};
use rowflow::ops::{
    ExternalSort, InnerJoiner, Join, LeftJoiner, Map, OuterJoiner, Reduce, RightJoiner, SortSpec,
};
use rowflow::record::stream_of;
use rowflow::reducers::{Count, First, MeanSpeed, Sum, TermFrequency, TopN};
use rowflow::testing::{assert_rows_close, assert_rows_equal, rows};
use rowflow::{Error, Record, Result};
use serde_json::json;

fn collect(stream: rowflow::RecordStream) -> Result<Vec<Record>> {
    stream.collect()
}

// ---- mappers ---------------------------------------------------------------

#[test]
fn strip_punctuation_keeps_letters_and_spaces() -> Result<()> {
    let out = collect(Map::new(StripPunctuation::new("text")).apply(stream_of(rows(json!([
        {"text": "hi, hi! hi..."},
        {"text": "world?Years"},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([{"text": "hi hi hi"}, {"text": "worldYears"}])),
    );
    Ok(())
}

#[test]
fn lowercase_rewrites_in_place() -> Result<()> {
    let out = collect(
        Map::new(Lowercase::new("text")).apply(stream_of(rows(json!([{"text": "HM, WHO iS"}])))),
    )?;
    assert_rows_equal(&out, &rows(json!([{"text": "hm, who is"}])));
    Ok(())
}

#[test]
fn split_emits_one_record_per_token() -> Result<()> {
    let out = collect(Map::new(Split::new("text")).apply(stream_of(rows(json!([
        {"doc_id": 1, "text": "it is me"},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"doc_id": 1, "text": "it"},
            {"doc_id": 1, "text": "is"},
            {"doc_id": 1, "text": "me"},
        ])),
    );
    Ok(())
}

#[test]
fn split_on_separator_set() -> Result<()> {
    let out = collect(Map::new(Split::on("csv", ",;")).apply(stream_of(rows(json!([
        {"csv": "a,b;;c"},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([{"csv": "a"}, {"csv": "b"}, {"csv": "c"}])),
    );
    Ok(())
}

#[test]
fn split_of_blank_text_emits_the_empty_token() -> Result<()> {
    let out = collect(
        Map::new(Split::new("text")).apply(stream_of(rows(json!([{"id": 7, "text": "   "}])))),
    )?;
    assert_rows_equal(&out, &rows(json!([{"id": 7, "text": ""}])));
    Ok(())
}

#[test]
fn project_is_idempotent() -> Result<()> {
    let input = rows(json!([{"a": 1, "b": 2, "c": 3}]));
    let once = collect(Map::new(Project::new(&["a", "b"])).apply(stream_of(input)))?;
    let twice = collect(Map::new(Project::new(&["a", "b"])).apply(stream_of(once.clone())))?;
    assert_rows_equal(&once, &rows(json!([{"a": 1, "b": 2}])));
    assert_rows_equal(&twice, &once);
    Ok(())
}

#[test]
fn project_fails_on_a_missing_column() {
    let result = collect(
        Map::new(Project::new(&["absent"])).apply(stream_of(rows(json!([{"a": 1}])))),
    );
    assert!(matches!(result, Err(Error::MissingField(name)) if name == "absent"));
}

#[test]
fn filter_drops_non_matching_records() -> Result<()> {
    let keep_even = Filter::new(|row: &Record| {
        row.get("n").and_then(rowflow::Value::as_i64).is_some_and(|n| n % 2 == 0)
    });
    let out = collect(Map::new(keep_even).apply(stream_of(rows(json!([
        {"n": 1}, {"n": 2}, {"n": 3}, {"n": 4},
    ])))))?;
    assert_rows_equal(&out, &rows(json!([{"n": 2}, {"n": 4}])));
    Ok(())
}

#[test]
fn product_keeps_integers_integral() -> Result<()> {
    let out = collect(Map::new(Product::new(&["a", "b"], "p")).apply(stream_of(rows(json!([
        {"a": 3, "b": 4},
        {"a": 2.5, "b": 4},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"a": 3, "b": 4, "p": 12},
            {"a": 2.5, "b": 4, "p": 10.0},
        ])),
    );
    Ok(())
}

#[test]
fn log_ratio_matches_reference_values() -> Result<()> {
    let out = collect(Map::new(LogRatio::new("left", "right", "ratio")).apply(stream_of(rows(
        json!([
            {"test_id": 1, "left": 5, "right": 10},
            {"test_id": 2, "left": 60, "right": 2},
            {"test_id": 3, "left": 3, "right": 15},
            {"test_id": 4, "left": 100, "right": 0.5},
            {"test_id": 5, "left": 48, "right": 15},
        ]),
    ))))?;
    let expected = rows(json!([
        {"test_id": 1, "left": 5, "right": 10, "ratio": -0.6931471805599453},
        {"test_id": 2, "left": 60, "right": 2, "ratio": 3.4011973816621555},
        {"test_id": 3, "left": 3, "right": 15, "ratio": -1.6094379124341003},
        {"test_id": 4, "left": 100, "right": 0.5, "ratio": 5.298317366548036},
        {"test_id": 5, "left": 48, "right": 15, "ratio": 1.1631508098056809},
    ]));
    assert_rows_close(&out, &expected, 1e-12);
    Ok(())
}

#[test]
fn haversine_matches_reference_values() -> Result<()> {
    let out = collect(Map::new(HaversineDistance::new("len", "start", "end")).apply(stream_of(
        rows(json!([
            {"start": [37.84870228730142, 55.73853974696249],
             "end": [37.8490418381989, 55.73832445777953]},
            {"start": [37.524768467992544, 55.88785375468433],
             "end": [37.52415172755718, 55.88807155843824]},
            {"start": [37.56963176652789, 55.846845586784184],
             "end": [37.57018438540399, 55.8469259692356]},
        ])),
    )))?;
    let lens: Vec<f64> = out
        .iter()
        .map(|row| row["len"].as_f64().expect("len is numeric"))
        .collect();
    let expected = [0.03202394407224201, 0.045464188432109455, 0.035647728095922];
    for (actual, expected) in lens.iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-9, "{actual} vs {expected}");
    }
    Ok(())
}

#[test]
fn haversine_is_symmetric_and_zero_at_coincidence() -> Result<()> {
    let here = json!([37.584684155881405, 55.78285809606314]);
    let there = json!([37.58415022864938, 55.78177368734032]);
    let out = collect(Map::new(HaversineDistance::new("d", "start", "end")).apply(stream_of(
        rows(json!([
            {"start": here.clone(), "end": there.clone()},
            {"start": there, "end": here.clone()},
            {"start": here.clone(), "end": here},
        ])),
    )))?;
    let forward = out[0]["d"].as_f64().expect("numeric");
    let backward = out[1]["d"].as_f64().expect("numeric");
    let nowhere = out[2]["d"].as_f64().expect("numeric");
    assert!((forward - backward).abs() < 1e-12);
    assert_eq!(nowhere, 0.0);
    Ok(())
}

#[test]
fn parse_timestamp_handles_both_forms() -> Result<()> {
    let out = collect(Map::new(ParseTimestamp::new("time", "weekday", "hour")).apply(stream_of(
        rows(json!([
            {"time": "20171020T112238"},
            {"time": "20171011T145553"},
            {"time": "20171024T144101.879000"},
            {"time": "20171022T131828.330000"},
        ])),
    )))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"time": "20171020T112238", "weekday": "Fri", "hour": 11},
            {"time": "20171011T145553", "weekday": "Wed", "hour": 14},
            {"time": "20171024T144101.879000", "weekday": "Tue", "hour": 14},
            {"time": "20171022T131828.330000", "weekday": "Sun", "hour": 13},
        ])),
    );
    Ok(())
}

#[test]
fn time_diff_is_absolute_hours() -> Result<()> {
    let out = collect(Map::new(TimeDiff::new("delta", "enter", "leave")).apply(stream_of(rows(
        json!([
            {"enter": "20171024T144059", "leave": "20171024T144101"},
            {"leave": "20171014T134825.215000", "enter": "20171014T134826.836000"},
        ]),
    ))))?;
    let forward = out[0]["delta"].as_f64().expect("numeric");
    let reversed = out[1]["delta"].as_f64().expect("numeric");
    assert!((forward - 2.0 / 3600.0).abs() < 1e-12);
    assert!((reversed - 1.621 / 3600.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn mapper_failures_surface_and_fuse_the_stream() {
    let mut stream = Map::new(Lowercase::new("text"))
        .apply(stream_of(rows(json!([{"text": "ok"}, {"text": 5}, {"text": "unreached"}]))));
    assert!(stream.next().expect("first record").is_ok());
    assert!(matches!(
        stream.next(),
        Some(Err(Error::FieldType { field, .. })) if field == "text"
    ));
    assert!(stream.next().is_none());
}

// ---- reducers --------------------------------------------------------------

#[test]
fn first_keeps_one_record_per_group() -> Result<()> {
    let out = collect(Reduce::new(First, &["k"]).apply(stream_of(rows(json!([
        {"k": 1, "v": "a"},
        {"k": 1, "v": "b"},
        {"k": 2, "v": "c"},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([{"k": 1, "v": "a"}, {"k": 2, "v": "c"}])),
    );
    Ok(())
}

#[test]
fn count_emits_group_keys_and_size() -> Result<()> {
    let out = collect(Reduce::new(Count::new("d"), &["a"]).apply(stream_of(rows(json!([
        {"a": 1, "b": 5, "c": 2},
        {"a": 1, "b": 6, "c": 1},
    ])))))?;
    assert_rows_equal(&out, &rows(json!([{"a": 1, "d": 2}])));
    Ok(())
}

#[test]
fn count_with_no_keys_spans_the_stream() -> Result<()> {
    let out = collect(Reduce::new(Count::new("n"), &[]).apply(stream_of(rows(json!([
        {"x": 1}, {"x": 2}, {"x": 3},
    ])))))?;
    assert_rows_equal(&out, &rows(json!([{"n": 3}])));
    Ok(())
}

#[test]
fn sum_aggregates_per_group() -> Result<()> {
    let out = collect(Reduce::new(Sum::new("b"), &["a"]).apply(stream_of(rows(json!([
        {"a": 1, "b": 2, "c": 4},
        {"a": 1, "b": 3, "c": 5},
        {"a": 2, "b": 1.5},
        {"a": 2, "b": 1},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([{"a": 1, "b": 5}, {"a": 2, "b": 2.5}])),
    );
    Ok(())
}

#[test]
fn top_n_keeps_the_largest_with_later_arrivals_winning_ties() -> Result<()> {
    let out = collect(Reduce::new(TopN::new("score", 2), &[]).apply(stream_of(rows(json!([
        {"id": "a", "score": 2},
        {"id": "b", "score": 2},
        {"id": "c", "score": 2},
        {"id": "d", "score": 1},
    ])))))?;
    // The min-heap is keyed by (value, arrival), so among equal scores the
    // earliest arrival is displaced first.
    assert_rows_equal(
        &out,
        &rows(json!([
            {"id": "b", "score": 2},
            {"id": "c", "score": 2},
        ])),
    );
    Ok(())
}

#[test]
fn top_n_emits_at_most_n_per_group() -> Result<()> {
    let out = collect(Reduce::new(TopN::new("score", 2), &["g"]).apply(stream_of(rows(json!([
        {"g": 1, "score": 5},
        {"g": 1, "score": 9},
        {"g": 1, "score": 7},
        {"g": 2, "score": 4},
    ])))))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"g": 1, "score": 7},
            {"g": 1, "score": 9},
            {"g": 2, "score": 4},
        ])),
    );
    Ok(())
}

#[test]
fn term_frequency_sums_to_one_in_first_appearance_order() -> Result<()> {
    let out = collect(
        Reduce::new(TermFrequency::new("word", "tf"), &["doc"]).apply(stream_of(rows(json!([
            {"doc": 1, "word": "hi"},
            {"doc": 1, "word": "am"},
            {"doc": 1, "word": "hi"},
            {"doc": 1, "word": "hi"},
        ])))),
    )?;
    assert_rows_close(
        &out,
        &rows(json!([
            {"doc": 1, "word": "hi", "tf": 0.75},
            {"doc": 1, "word": "am", "tf": 0.25},
        ])),
        1e-12,
    );
    let total: f64 = out.iter().map(|r| r["tf"].as_f64().expect("numeric")).sum();
    assert!((total - 1.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn mean_speed_divides_total_distance_by_total_time() -> Result<()> {
    let out = collect(
        Reduce::new(MeanSpeed::new("speed", "len", "time"), &["test_id"]).apply(stream_of(rows(
            json!([
                {"test_id": 1, "len": 5, "time": 10},
                {"test_id": 1, "len": 60, "time": 2},
                {"test_id": 1, "len": 3, "time": 15},
                {"test_id": 2, "len": 100, "time": 0.5},
                {"test_id": 2, "len": 48, "time": 15},
            ]),
        ))),
    )?;
    assert_rows_close(
        &out,
        &rows(json!([
            {"test_id": 1, "speed": 2.5185185185185186},
            {"test_id": 2, "speed": 9.548387096774194},
        ])),
        1e-12,
    );
    Ok(())
}

// ---- external sort ---------------------------------------------------------

#[test]
fn sort_orders_by_the_key_sequence() -> Result<()> {
    let out = collect(ExternalSort::new(SortSpec::by(&["count", "text"])).apply(stream_of(rows(
        json!([
            {"count": 2, "text": "b"},
            {"count": 1, "text": "z"},
            {"count": 1, "text": "a"},
        ]),
    ))))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"count": 1, "text": "a"},
            {"count": 1, "text": "z"},
            {"count": 2, "text": "b"},
        ])),
    );
    Ok(())
}

#[test]
fn reverse_sort_inverts_the_whole_key() -> Result<()> {
    let out = collect(
        ExternalSort::new(SortSpec::by(&["count", "text"]).descending()).apply(stream_of(rows(
            json!([
                {"count": 1, "text": "hm"},
                {"count": 1, "text": "i"},
                {"count": 2, "text": "am"},
                {"count": 3, "text": "hi"},
                {"count": 3, "text": "is"},
            ]),
        ))),
    )?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"count": 3, "text": "is"},
            {"count": 3, "text": "hi"},
            {"count": 2, "text": "am"},
            {"count": 1, "text": "i"},
            {"count": 1, "text": "hm"},
        ])),
    );
    Ok(())
}

#[test]
fn grouped_sort_keeps_groups_contiguous_in_arrival_order() -> Result<()> {
    let out = collect(
        ExternalSort::new(SortSpec::by(&["count", "text"]).descending().per_group(&["id"]))
            .apply(stream_of(rows(json!([
                {"id": 1, "count": 1, "text": "hm"},
                {"id": 1, "count": 1, "text": "i"},
                {"id": 1, "count": 1, "text": "it"},
                {"id": 1, "count": 1, "text": "marrio"},
                {"id": 1, "count": 3, "text": "me"},
                {"id": 2, "count": 1, "text": "who"},
                {"id": 2, "count": 2, "text": "am"},
                {"id": 2, "count": 3, "text": "hi"},
                {"id": 2, "count": 3, "text": "is"},
            ])))),
    )?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"id": 1, "count": 3, "text": "me"},
            {"id": 1, "count": 1, "text": "marrio"},
            {"id": 1, "count": 1, "text": "it"},
            {"id": 1, "count": 1, "text": "i"},
            {"id": 1, "count": 1, "text": "hm"},
            {"id": 2, "count": 3, "text": "is"},
            {"id": 2, "count": 3, "text": "hi"},
            {"id": 2, "count": 2, "text": "am"},
            {"id": 2, "count": 1, "text": "who"},
        ])),
    );
    Ok(())
}

#[test]
fn sort_of_an_empty_stream_is_empty() -> Result<()> {
    let out = collect(ExternalSort::new(SortSpec::by(&["k"])).apply(stream_of(Vec::new())))?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn sort_output_is_a_permutation_of_its_input() -> Result<()> {
    let input = rows(json!([
        {"k": 3, "tag": "x"}, {"k": 1, "tag": "y"}, {"k": 2, "tag": "z"}, {"k": 1, "tag": "w"},
    ]));
    let mut out = collect(ExternalSort::new(SortSpec::by(&["k"])).apply(stream_of(input.clone())))?;
    assert_eq!(out.len(), input.len());
    let mut input = input;
    let key = |r: &Record| serde_json::to_string(r).expect("serializable");
    out.sort_by_key(&key);
    input.sort_by_key(&key);
    assert_rows_equal(&out, &input);
    Ok(())
}

// ---- join ------------------------------------------------------------------

#[test]
fn outer_join_suffixes_collisions_stickily() -> Result<()> {
    let left = rows(json!([
        {"player": 1, "duplicate": "b"},
        {"player": 2, "duplicate": "c"},
    ]));
    let right = rows(json!([
        {"player": 0, "duplicate": 1},
        {"player": 1, "duplicate": 2},
    ]));
    let out = collect(
        Join::new(OuterJoiner::with_suffixes("_1", "_2"), &["player"])
            .apply(stream_of(left), stream_of(right)),
    )?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"player": 0, "duplicate": 1},
            {"player": 1, "duplicate_1": "b", "duplicate_2": 2},
            {"player": 2, "duplicate_1": "c"},
        ])),
    );
    Ok(())
}

#[test]
fn inner_join_crosses_matching_groups() -> Result<()> {
    let left = rows(json!([
        {"k": 1, "l": "a"},
        {"k": 1, "l": "b"},
        {"k": 2, "l": "c"},
    ]));
    let right = rows(json!([
        {"k": 1, "r": 10},
        {"k": 3, "r": 30},
    ]));
    let out = collect(Join::new(InnerJoiner::new(), &["k"]).apply(stream_of(left), stream_of(right)))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"k": 1, "l": "a", "r": 10},
            {"k": 1, "l": "b", "r": 10},
        ])),
    );
    Ok(())
}

#[test]
fn left_join_keeps_unmatched_left_rows() -> Result<()> {
    let left = rows(json!([{"k": 1, "l": "a"}, {"k": 2, "l": "b"}]));
    let right = rows(json!([{"k": 1, "r": 10}]));
    let out = collect(Join::new(LeftJoiner::new(), &["k"]).apply(stream_of(left), stream_of(right)))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"k": 1, "l": "a", "r": 10},
            {"k": 2, "l": "b"},
        ])),
    );
    Ok(())
}

#[test]
fn right_join_keeps_unmatched_right_rows() -> Result<()> {
    let left = rows(json!([{"k": 1, "l": "a"}]));
    let right = rows(json!([{"k": 1, "r": 10}, {"k": 2, "r": 20}]));
    let out =
        collect(Join::new(RightJoiner::new(), &["k"]).apply(stream_of(left), stream_of(right)))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"k": 1, "l": "a", "r": 10},
            {"k": 2, "r": 20},
        ])),
    );
    Ok(())
}

#[test]
fn join_on_no_keys_is_a_cross_product() -> Result<()> {
    let left = rows(json!([{"l": 1}, {"l": 2}]));
    let right = rows(json!([{"r": "x"}]));
    let out =
        collect(Join::new(InnerJoiner::new(), &[]).apply(stream_of(left), stream_of(right)))?;
    assert_rows_equal(
        &out,
        &rows(json!([{"l": 1, "r": "x"}, {"l": 2, "r": "x"}])),
    );
    Ok(())
}

#[test]
fn join_accepts_consistently_descending_inputs() -> Result<()> {
    let left = rows(json!([{"k": 3, "l": "c"}, {"k": 2, "l": "b"}, {"k": 1, "l": "a"}]));
    let right = rows(json!([{"k": 3, "r": 30}, {"k": 1, "r": 10}]));
    let out =
        collect(Join::new(InnerJoiner::new(), &["k"]).apply(stream_of(left), stream_of(right)))?;
    assert_rows_equal(
        &out,
        &rows(json!([
            {"k": 3, "l": "c", "r": 30},
            {"k": 1, "l": "a", "r": 10},
        ])),
    );
    Ok(())
}

#[test]
fn join_rejects_an_out_of_order_side() {
    let left = rows(json!([{"k": 1}, {"k": 2}, {"k": 0}]));
    let right = rows(json!([{"k": 1, "r": 1}]));
    let result =
        collect(Join::new(InnerJoiner::new(), &["k"]).apply(stream_of(left), stream_of(right)));
    assert!(matches!(result, Err(Error::NotSorted)));
}

#[test]
fn join_rejects_sides_sorted_in_opposite_directions() {
    let left = rows(json!([{"k": 1}, {"k": 2}, {"k": 3}]));
    let right = rows(json!([{"k": 3, "r": 1}, {"k": 2, "r": 2}, {"k": 1, "r": 3}]));
    let result =
        collect(Join::new(InnerJoiner::new(), &["k"]).apply(stream_of(left), stream_of(right)));
    assert!(matches!(result, Err(Error::NotSorted)));
}
