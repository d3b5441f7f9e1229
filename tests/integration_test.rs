// Integration tests for storerank
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storerank_core::{
    Candidate, CandidateFilter, Catalog, CatalogColumns, FrequencyTable, RuleTable,
    SegmentingTokenizer, Vector,
};
use storerank_embedding::{EmbeddingModel, EmbeddingProvider, HashingModel};
use storerank_engine::{Error, Recommender, StaticCatalogSource};
use storerank_storage::{cache_key, FileStore, KeyValueStore, LmdbStore, MemoryStore, ResultCache};
use tempfile::TempDir;

/// Hashing model that counts how often it is asked for vectors
struct CountingModel {
    inner: HashingModel,
    calls: AtomicUsize,
}

impl CountingModel {
    fn new() -> Self {
        Self {
            inner: HashingModel::new(128),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingModel for CountingModel {
    fn model_id(&self) -> &str {
        "counting"
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn embed_batch(&self, tokens: &[String]) -> storerank_embedding::Result<Vec<Vector>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(tokens)
    }
}

/// Built-in rules that count how often they are consulted
struct CountingFilter {
    rules: RuleTable,
    calls: AtomicUsize,
}

impl CountingFilter {
    fn new() -> Self {
        Self {
            rules: RuleTable::builtin().unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CandidateFilter for CountingFilter {
    fn filter<'a>(&self, query: &str, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rules.filter(query, candidates)
    }
}

struct Harness {
    recommender: Recommender,
    model: Arc<CountingModel>,
    filter: Arc<CountingFilter>,
}

fn harness(catalog: Catalog, store: Arc<dyn KeyValueStore>) -> Harness {
    let model = Arc::new(CountingModel::new());
    let filter = Arc::new(CountingFilter::new());
    let recommender = Recommender::new(
        Arc::new(StaticCatalogSource::new(catalog)),
        Arc::new(SegmentingTokenizer::new(["매장", "카페"], 1)),
        filter.clone(),
        Arc::new(EmbeddingProvider::new(model.clone())),
        ResultCache::new(store),
    );
    Harness {
        recommender,
        model,
        filter,
    }
}

fn table(raw: &str) -> FrequencyTable {
    raw.parse().unwrap()
}

fn three_stores() -> Catalog {
    Catalog::from_candidates(vec![
        Candidate::new("역삼점", table("{'디저트': 6}")).with_address("서울특별시 강남구 역삼동"),
        Candidate::new("해운대점", table("{'커피': 2, '바다': 9}")).with_address("부산광역시 해운대구"),
        Candidate::new("성수점", table("{'커피': 7, '디저트': 1}")).with_address("서울특별시 성동구"),
    ])
}

fn five_stores() -> Catalog {
    Catalog::from_candidates(vec![
        Candidate::new("역삼점", table("{'커피': 1}")).with_address("서울특별시 강남구 역삼동"),
        Candidate::new("해운대점", table("{'커피': 9}")).with_address("부산광역시 해운대구"),
        Candidate::new("강남대로점", table("{'커피': 4}")).with_address("서울특별시 강남구 강남대로"),
        Candidate::new("성수점", table("{'커피': 8}")).with_address("서울특별시 성동구"),
        Candidate::new("제주점", table("{'커피': 5}")).with_address("제주특별자치도 제주시"),
    ])
}

fn ids(results: &[storerank_core::RankedStore]) -> Vec<&str> {
    results.iter().map(|r| r.identifier.as_str()).collect()
}

#[test]
fn test_unfiltered_query_ranks_whole_catalog() {
    let h = harness(three_stores(), Arc::new(MemoryStore::new()));
    let out = h.recommender.recommend("커피 디저트").unwrap();

    assert!(!out.cached);
    assert_eq!(ids(&out.results), vec!["성수점", "역삼점", "해운대점"]);
    let scores: Vec<f64> = out.results.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![8.0, 6.0, 2.0]);
}

#[test]
fn test_district_keyword_narrows_candidates() {
    let h = harness(five_stores(), Arc::new(MemoryStore::new()));
    let catalog = five_stores();
    let filtered = RuleTable::builtin()
        .unwrap()
        .filter("강남역 커피", catalog.candidates());
    assert_eq!(filtered.len(), 2);

    let out = h.recommender.recommend("강남역 커피").unwrap();
    assert!(out.results.len() <= 2);
    assert_eq!(ids(&out.results), vec!["강남대로점", "역삼점"]);
}

#[test]
fn test_punctuation_only_query_is_invalid_and_not_cached() {
    let store = Arc::new(MemoryStore::new());
    let h = harness(three_stores(), store.clone());

    for query in ["?!", "...  ,,, ;", "매장 카페"] {
        assert!(matches!(h.recommender.recommend(query), Err(Error::InvalidQuery)));
    }
    assert!(store.is_empty());
    assert_eq!(h.model.calls(), 0);
    assert_eq!(h.filter.calls(), 0);
}

#[test]
fn test_malformed_frequency_row_is_skipped() {
    let csv = "Store_Name,storeAddress,storeType,frequency,parking\n\
               역삼점,서울특별시 강남구,일반,\"{'커피': 3}\",True\n\
               깨진점,서울특별시 강남구,일반,\"{'커피': 3\",True\n\
               음수점,서울특별시 강남구,일반,\"{'커피': -1}\",False\n\
               성수점,서울특별시 성동구,일반,\"{'커피': 5}\",False\n";
    let catalog = Catalog::from_reader(csv.as_bytes(), &CatalogColumns::default()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.rejected().len(), 2);
    assert_eq!(catalog.rejected()[0].identifier.as_deref(), Some("깨진점"));

    let h = harness(catalog, Arc::new(MemoryStore::new()));
    let out = h.recommender.recommend("커피").unwrap();
    assert_eq!(ids(&out.results), vec!["성수점", "역삼점"]);
    assert_eq!(out.skipped_records, 2);
}

#[test]
fn test_repeated_query_skips_model_and_filter() {
    let h = harness(three_stores(), Arc::new(MemoryStore::new()));

    let first = h.recommender.recommend("바다 커피").unwrap();
    let model_calls = h.model.calls();
    let filter_calls = h.filter.calls();
    assert!(model_calls >= 1);
    assert_eq!(filter_calls, 1);

    let second = h.recommender.recommend("바다 커피").unwrap();
    assert!(second.cached);
    assert_eq!(second.results, first.results);
    assert_eq!(h.model.calls(), model_calls);
    assert_eq!(h.filter.calls(), filter_calls);
}

#[test]
fn test_one_character_difference_is_a_different_query() {
    let store = Arc::new(MemoryStore::new());
    let h = harness(three_stores(), store.clone());
    h.recommender.recommend("커피").unwrap();
    let out = h.recommender.recommend("커피 ").unwrap();

    assert!(!out.cached);
    assert_ne!(cache_key("커피"), cache_key("커피 "));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_token_embeddings_are_computed_once_per_process() {
    let h = harness(three_stores(), Arc::new(MemoryStore::new()));
    h.recommender.recommend("커피").unwrap();
    let calls = h.model.calls();

    // new text, same tokens: the result cache misses but the embedding cache hits
    let out = h.recommender.recommend("커피!").unwrap();
    assert!(!out.cached);
    assert_eq!(h.model.calls(), calls);
    assert_eq!(h.filter.calls(), 2);
}

#[test]
fn test_top_ten_bound() {
    let stores: Vec<Candidate> = (0..25)
        .map(|i| {
            Candidate::new(format!("store-{:02}", i), table(&format!("{{'커피': {}}}", i)))
                .with_address("서울특별시 성동구")
        })
        .collect();
    let h = harness(Catalog::from_candidates(stores), Arc::new(MemoryStore::new()));
    let out = h.recommender.recommend("커피").unwrap();

    assert_eq!(out.results.len(), 10);
    assert_eq!(out.results[0].identifier, "store-24");
    assert_eq!(out.results[9].identifier, "store-15");
    assert!(out.results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_zero_scores_keep_catalog_order() {
    let h = harness(five_stores(), Arc::new(MemoryStore::new()));
    let out = h.recommender.recommend("주차").unwrap();
    // every store lacks the parking flag, so the flag rule empties the set
    assert!(out.results.is_empty());

    let out = h.recommender.recommend("라떼").unwrap();
    assert!(out.results.iter().all(|r| r.score == 0.0));
    assert_eq!(
        ids(&out.results),
        vec!["역삼점", "해운대점", "강남대로점", "성수점", "제주점"]
    );
}

#[test]
fn test_substring_triggering_is_not_token_aware() {
    // "해운대구" contains "대구", which fires the Daegu address rule; the
    // Busan store survives only because its address also contains "대구"
    let h = harness(five_stores(), Arc::new(MemoryStore::new()));
    let out = h.recommender.recommend("해운대구 커피").unwrap();
    assert_eq!(ids(&out.results), vec!["해운대점"]);
    assert_eq!(out.results[0].score, 9.0);

    let seoul_only = Catalog::from_candidates(vec![
        Candidate::new("역삼점", table("{'커피': 1}")).with_address("서울특별시 강남구 역삼동"),
        Candidate::new("성수점", table("{'커피': 8}")).with_address("서울특별시 성동구"),
    ]);
    let h = harness(seoul_only, Arc::new(MemoryStore::new()));
    let out = h.recommender.recommend("해운대구 커피").unwrap();
    assert!(out.results.is_empty());
}

#[test]
fn test_file_cache_survives_restart() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("cache");

    let first = harness(three_stores(), Arc::new(FileStore::new(&dir)));
    let computed = first.recommender.recommend("커피 디저트").unwrap();
    let path = dir.join(format!("{}.json", cache_key("커피 디저트")));
    let bytes = std::fs::read(&path).unwrap();

    let second = harness(three_stores(), Arc::new(FileStore::new(&dir)));
    let served = second.recommender.recommend("커피 디저트").unwrap();
    assert!(served.cached);
    assert_eq!(served.results, computed.results);
    assert_eq!(second.model.calls(), 0);
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_corrupt_cache_file_is_recomputed() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(temp.path()));
    store.put(&cache_key("커피"), b"\x00\x01 not json").unwrap();

    let h = harness(three_stores(), store);
    let out = h.recommender.recommend("커피").unwrap();
    assert!(!out.cached);
    assert_eq!(ids(&out.results), vec!["성수점", "해운대점", "역삼점"]);

    let again = h.recommender.recommend("커피").unwrap();
    assert!(again.cached);
    assert_eq!(again.results, out.results);
}

#[test]
fn test_lmdb_backend() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(LmdbStore::with_map_size(temp.path(), 16 * 1024 * 1024).unwrap());
    let h = harness(three_stores(), store);

    let first = h.recommender.recommend("바다").unwrap();
    assert_eq!(first.results[0].identifier, "해운대점");
    assert_eq!(first.results[0].score, 9.0);
    assert!(h.recommender.recommend("바다").unwrap().cached);
}

#[test]
fn test_concurrent_requests_agree() {
    let h = harness(five_stores(), Arc::new(MemoryStore::new()));
    let queries = ["커피", "제주 커피", "강남역 커피", "라떼 커피"];

    let outputs: Vec<Vec<storerank_core::RankedStore>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recommender = &h.recommender;
                let query = queries[i % queries.len()];
                scope.spawn(move || recommender.recommend(query).unwrap().results)
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for (i, results) in outputs.iter().enumerate() {
        let expected = h.recommender.recommend(queries[i % queries.len()]).unwrap();
        assert!(expected.cached);
        assert_eq!(*results, expected.results);
    }
    assert_eq!(ids(&outputs[1]), vec!["제주점"]);
}
