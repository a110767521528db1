use crate::entities::user_data::UserData;
use crate::repositories::user_data;
use futures::stream::{self, BoxStream, TryChunksError};
use futures::{Stream, StreamExt, TryStreamExt};
use rust_decimal::Decimal;
use sqlx::MySqlConnection;
use std::io;
use std::path::Path;
use tracing::{info, warn};

pub const AGE_THRESHOLD: u32 = 25;

/// Every `user_data` row, one at a time.
pub fn stream_users(conn: &mut MySqlConnection) -> BoxStream<'_, sqlx::Result<UserData>> {
    user_data::stream_all(conn)
}

/// Groups `items` into batches of at most `batch_size`; the last one may be shorter.
pub fn in_batches<S, T, E>(items: S, batch_size: usize) -> impl Stream<Item = Result<Vec<T>, E>>
where
    S: Stream<Item = Result<T, E>>,
{
    items
        .try_chunks(batch_size.max(1))
        .map_err(|TryChunksError(_, e)| e)
}

pub fn stream_users_in_batches(
    conn: &mut MySqlConnection,
    batch_size: usize,
) -> impl Stream<Item = sqlx::Result<Vec<UserData>>> + '_ {
    in_batches(stream_users(conn), batch_size)
}

/// Keeps the users older than [`AGE_THRESHOLD`], working batch by batch.
pub fn over_age_threshold<S, E>(batches: S) -> impl Stream<Item = Result<UserData, E>>
where
    S: Stream<Item = Result<Vec<UserData>, E>>,
{
    let threshold = Decimal::from(AGE_THRESHOLD);
    batches
        .map_ok(move |batch| {
            let selected = batch.into_iter().filter(move |user| user.age > threshold);
            stream::iter(selected.map(Ok::<UserData, E>))
        })
        .try_flatten()
}

pub fn batch_processing(
    conn: &mut MySqlConnection,
    batch_size: usize,
) -> impl Stream<Item = sqlx::Result<UserData>> + '_ {
    over_age_threshold(stream_users_in_batches(conn, batch_size))
}

pub async fn paginate_users(
    conn: &mut MySqlConnection,
    page_size: u64,
    offset: u64,
) -> sqlx::Result<Vec<UserData>> {
    user_data::fetch_page(conn, page_size, offset).await
}

/// Yields pages of `page_size` fetched on demand, stopping at the first empty page.
/// `fetch` receives the threaded `state`, the page size and the offset.
pub fn lazy_paginate_with<St, T, E, F, Fut>(
    state: St,
    page_size: u64,
    fetch: F,
) -> impl Stream<Item = Result<Vec<T>, E>>
where
    F: FnMut(St, u64, u64) -> Fut,
    Fut: Future<Output = Result<(St, Vec<T>), E>>,
{
    let page_size = page_size.max(1);
    stream::try_unfold(
        (state, fetch, 0u64),
        move |(state, mut fetch, offset)| async move {
            let (state, page) = fetch(state, page_size, offset).await?;
            if page.is_empty() {
                return Ok::<_, E>(None);
            }
            Ok(Some((page, (state, fetch, offset + page_size))))
        },
    )
}

pub fn lazy_paginate(
    conn: &mut MySqlConnection,
    page_size: u64,
) -> impl Stream<Item = sqlx::Result<Vec<UserData>>> + '_ {
    lazy_paginate_with(conn, page_size, |conn, page_size, offset| async move {
        let page = paginate_users(&mut *conn, page_size, offset).await?;
        Ok::<_, sqlx::Error>((conn, page))
    })
}

pub fn stream_user_ages(conn: &mut MySqlConnection) -> BoxStream<'_, sqlx::Result<Decimal>> {
    user_data::stream_ages(conn)
}

/// Mean of `values` in a single pass, `None` when there are none.
pub async fn average<S, E>(values: S) -> Result<Option<Decimal>, E>
where
    S: Stream<Item = Result<Decimal, E>>,
{
    let (sum, count) = values
        .try_fold((Decimal::ZERO, 0u64), |(sum, count), value| async move {
            Ok((sum + value, count + 1))
        })
        .await?;
    match count {
        0 => Ok(None),
        count => Ok(Some(sum / Decimal::from(count))),
    }
}

pub async fn average_age(conn: &mut MySqlConnection) -> sqlx::Result<Option<Decimal>> {
    average(stream_user_ages(conn)).await
}

pub struct CsvRecords {
    pub records: Vec<UserData>,
    pub skipped: usize,
}

/// Parses `user_id,name,email,age` records, skipping the malformed ones.
pub fn read_csv<R: io::Read>(reader: R) -> CsvRecords {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = vec![];
    let mut skipped = 0;
    for (index, record) in reader.deserialize::<UserData>().enumerate() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(record = index + 1, "Skipping malformed record: {e}");
                skipped += 1;
            }
        }
    }
    CsvRecords { records, skipped }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub inserted: usize,
    pub existing: usize,
    pub skipped: usize,
}

/// Creates `user_data` if needed and loads every well-formed record of the CSV file.
pub async fn seed(conn: &mut MySqlConnection, csv_path: &Path) -> anyhow::Result<SeedSummary> {
    user_data::create_table(conn).await?;
    info!("Table user_data is ready");

    let file = std::fs::File::open(csv_path)?;
    let CsvRecords { records, skipped } = read_csv(file);
    let mut summary = SeedSummary {
        skipped,
        ..Default::default()
    };
    for record in &records {
        match user_data::insert_ignore(conn, record).await? {
            true => summary.inserted += 1,
            false => summary.existing += 1,
        }
    }
    info!(
        inserted = summary.inserted,
        existing = summary.existing,
        skipped = summary.skipped,
        "Seeded user_data"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn user(user_id: &str, age: Decimal) -> UserData {
        UserData {
            user_id: user_id.to_string(),
            name: format!("User {user_id}"),
            email: format!("{user_id}@example.com"),
            age,
        }
    }

    fn rows(count: usize) -> impl Stream<Item = Result<usize, Infallible>> {
        stream::iter((0..count).map(Ok))
    }

    #[tokio::test]
    async fn batches_keep_order_and_never_end_empty() {
        let batches: Vec<Vec<usize>> = in_batches(rows(7), 3).try_collect().await.unwrap();
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);

        let batches: Vec<Vec<usize>> = in_batches(rows(0), 3).try_collect().await.unwrap();
        assert!(batches.is_empty());
    }

    #[tokio::test]
    async fn zero_batch_size_yields_single_rows() {
        let batches: Vec<Vec<usize>> = in_batches(rows(2), 0).try_collect().await.unwrap();
        assert_eq!(batches, vec![vec![0], vec![1]]);
    }

    #[tokio::test]
    async fn batch_errors_are_propagated() {
        let items = stream::iter(vec![Ok(1), Err("boom"), Ok(2)]);
        let result: Result<Vec<Vec<i32>>, &str> = in_batches(items, 5).try_collect().await;
        assert_eq!(result, Err("boom"));
    }

    #[tokio::test]
    async fn selects_users_over_the_age_threshold() {
        let batches = stream::iter(vec![
            Ok::<_, Infallible>(vec![
                user("a", Decimal::from(25)),
                user("b", Decimal::from(26)),
            ]),
            Ok(vec![user("c", Decimal::from(80))]),
        ]);
        let selected: Vec<UserData> = over_age_threshold(batches).try_collect().await.unwrap();
        let ids: Vec<&str> = selected.iter().map(|user| user.user_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn lazy_pagination_advances_until_an_empty_page() {
        let source: Vec<u32> = (0..5).collect();
        let fetch = |source: Vec<u32>, page_size: u64, offset: u64| async move {
            let page = source
                .iter()
                .skip(offset as usize)
                .take(page_size as usize)
                .copied()
                .collect();
            Ok::<_, Infallible>((source, page))
        };
        let pages: Vec<Vec<u32>> = lazy_paginate_with(source, 2, fetch)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[tokio::test]
    async fn averages_in_one_pass() {
        let ages = [20, 30, 40].map(|age| Ok::<_, Infallible>(Decimal::from(age)));
        let ages = stream::iter(ages);
        assert_eq!(average(ages).await.unwrap(), Some(Decimal::from(30)));
    }

    #[tokio::test]
    async fn average_of_nothing_is_none() {
        let ages = stream::iter(Vec::<Result<Decimal, Infallible>>::new());
        assert_eq!(average(ages).await.unwrap(), None);
    }

    #[test]
    fn reads_csv_and_skips_malformed_records() {
        let csv = "user_id,name,email,age\n\
            00234e50-34eb-4ce2-94ec-26e3fa749796,Dan Altenwerth Jr.,Molly59@gmail.com,67\n\
            broken-row,Missing Age,missing@example.com,\n\
            006bfede-724d-4cdd-a2a6-59700f40d0da,Glenda Wisozk,Miriam21@gmail.com,119\n";
        let CsvRecords { records, skipped } = read_csv(csv.as_bytes());

        assert_eq!(skipped, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Dan Altenwerth Jr.");
        assert_eq!(records[1].age, Decimal::from(119));
    }
}
