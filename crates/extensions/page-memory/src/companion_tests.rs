use super::*;
use bite_protocols::Command;
use futures::StreamExt;

#[tokio::test]
async fn test_records_pushes() {
    let companion = MemoryCompanion::new();
    companion
        .push(Push::log(LogLevel::Info, "hello"))
        .await
        .unwrap();
    companion.push(Push::CloseSession).await.unwrap();

    assert_eq!(companion.pushes().len(), 2);
    assert_eq!(companion.logs(), vec![(LogLevel::Info, "hello".to_string())]);
    assert_eq!(companion.snapshots(), vec![Push::CloseSession]);
}

#[tokio::test]
async fn test_fail_next() {
    let companion = MemoryCompanion::new();
    companion.fail_next(2);

    assert!(companion.push(Push::CloseSession).await.is_err());
    assert!(companion.push(Push::CloseSession).await.is_err());
    assert!(companion.push(Push::CloseSession).await.is_ok());
    assert_eq!(companion.attempts(), 3);
    assert_eq!(companion.pushes().len(), 1);
}

#[tokio::test]
async fn test_scripted_source_delivers_in_order() {
    let source = ScriptedSource::new();
    assert!(!source.send(Inbound::new(Command::Toggle)));

    let mut stream = source.subscribe().await.unwrap();
    assert!(source.send(Inbound::new(Command::Toggle)));
    assert!(source.send(Inbound::new(Command::CloseSession)));
    source.end();

    let first = stream.next().await.unwrap().unwrap();
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(first.command, Command::Toggle);
    assert_eq!(second.command, Command::CloseSession);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_resubscribe_replaces_channel() {
    let source = ScriptedSource::new();
    let mut old = source.subscribe().await.unwrap();
    let mut new = source.subscribe().await.unwrap();
    assert_eq!(source.subscriptions(), 2);

    source.send(Inbound::new(Command::Toggle));
    assert!(old.next().await.is_none());
    assert!(new.next().await.is_some());
}
