mod common;

use common::{ids, seeded, Todo};
use strata_data::prelude::*;

fn repo(store: MemoryStore<Todo>) -> MapperRepository<Todo, MemoryStore<Todo>> {
    MapperRepository::new(store)
}

#[tokio::test]
async fn test_save_and_find() {
    let repo = repo(MemoryStore::new());
    let saved = repo.save(Todo::new("write tests")).await.unwrap();
    assert_eq!(saved.id, 1);
    assert_eq!(repo.find_by_id(1).await.unwrap(), saved);
    assert!(repo.exists_by_id(1).await.unwrap());
    assert!(!repo.exists_by_id(2).await.unwrap());
}

#[tokio::test]
async fn test_save_all_single_batch() {
    let repo = repo(MemoryStore::new());
    let saved = repo
        .save_all(vec![Todo::new("a"), Todo::new("b"), Todo::new("c")])
        .await
        .unwrap();
    assert_eq!(ids(&saved), vec![1, 2, 3]);
    assert_eq!(repo.count().await.unwrap(), 3);
    assert!(repo.save_all(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_all_rejected_batch_stores_nothing() {
    let store = seeded(2).await;
    let repo = repo(store.clone());
    let err = repo
        .save_all(vec![Todo::new("fresh"), Todo { id: 1, ..Todo::new("clash") }])
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Database(_)));
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_find_all_and_by_id() {
    let repo = repo(seeded(5).await);
    assert_eq!(ids(&repo.find_all().await.unwrap()), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        ids(&repo.find_all_by_id(&[4, 2, 99]).await.unwrap()),
        vec![2, 4]
    );
    assert!(repo.find_all_by_id(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_and_delete_by_id() {
    let repo = repo(seeded(3).await);
    let first = repo.find_by_id(1).await.unwrap();
    repo.delete(&first).await.unwrap();
    repo.delete_by_id(3).await.unwrap();
    assert_eq!(ids(&repo.find_all().await.unwrap()), vec![2]);
    assert!(repo.delete(&first).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_all_by_id_counts() {
    let repo = repo(seeded(6).await);
    assert_eq!(repo.delete_all_by_id(&[2, 4, 40]).await.unwrap(), 2);
    assert_eq!(repo.delete_all_by_id(&[]).await.unwrap(), 0);
    assert_eq!(ids(&repo.find_all().await.unwrap()), vec![1, 3, 5, 6]);
}

#[tokio::test]
async fn test_delete_all_commits_every_delete() {
    let repo = repo(seeded(4).await);
    let doomed = repo.find_all_by_id(&[1, 3]).await.unwrap();
    repo.delete_all(&doomed).await.unwrap();
    assert_eq!(ids(&repo.find_all().await.unwrap()), vec![2, 4]);
}

#[tokio::test]
async fn test_delete_all_rolls_back_on_missing_entity() {
    let repo = repo(seeded(4).await);
    let mut doomed = repo.find_all_by_id(&[1, 2]).await.unwrap();
    doomed.push(Todo { id: 50, ..Todo::new("ghost") });

    let err = repo.delete_all(&doomed).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(repo.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_find_all_by_sort() {
    let repo = repo(MemoryStore::new());
    repo.save_all(vec![
        Todo::new("b"),
        Todo::new("a"),
        Todo::new("c"),
        Todo::new("a"),
    ])
    .await
    .unwrap();

    let sort: Sort = "title,-id".parse().unwrap();
    let sorted = repo.find_all_by_sort(&sort).await.unwrap();
    assert_eq!(ids(&sorted), vec![4, 2, 1, 3]);

    let err = repo
        .find_all_by_sort(&Sort::by("priority", Direction::Asc))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Validation(_)));
}

#[tokio::test]
async fn test_find_all_by_page_slices_in_storage() {
    let repo = repo(seeded(25).await);
    let pageable = Pageable::of(2, 10).with_sort(Sort::by("id", Direction::Desc));
    let page = repo.find_all_by_page(&pageable).await.unwrap();
    assert_eq!(ids(page.content()), vec![5, 4, 3, 2, 1]);
    assert_eq!(page.total_elements(), 25);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.number(), 2);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_find_all_by_page_unpaged() {
    let repo = repo(seeded(7).await);
    let page = repo.find_all_by_page(&Pageable::unpaged()).await.unwrap();
    assert_eq!(page.content().len(), 7);
    assert_eq!(page.size(), 7);
    assert_eq!(page.total_pages(), 1);

    let empty = MapperRepository::<Todo, _>::new(MemoryStore::new());
    let page = empty.find_all_by_page(&Pageable::unpaged()).await.unwrap();
    assert_eq!(page.total_pages(), 0);
}
