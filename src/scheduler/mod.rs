/// 검색 입력 타이밍 제어
/// 1. Debouncer: 입력이 멈춘 뒤 대기 시간(quiet period)이 지나야 실행
/// 2. RequestSequence: 요청마다 증가하는 번호를 붙여 오래된 응답을 버림
// region:    --- Imports
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

// endregion: --- Imports

// region:    --- Request Sequence
/// 단조 증가하는 요청 번호
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 요청 번호 발급
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 가장 최근에 발급된 번호인지 확인
    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

// endregion: --- Request Sequence

// region:    --- Debouncer
/// 대기 시간 내 새 호출이 들어오면 이전 호출은 실행되지 않는다.
/// 이미 실행을 시작한 호출은 취소하지 않는다.
pub struct Debouncer {
    quiet_period: Duration,
    sequence: Arc<RequestSequence>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            sequence: Arc::new(RequestSequence::new()),
        }
    }

    /// 작업 예약 (대기 중인 이전 작업은 무효화)
    pub fn call<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.sequence.issue();
        let sequence = Arc::clone(&self.sequence);
        let quiet_period = self.quiet_period;

        tokio::spawn(async move {
            sleep(quiet_period).await;
            if !sequence.is_latest(ticket) {
                debug!("{:<12} --> 새 입력으로 취소된 작업: {}", "Scheduler", ticket);
                return;
            }
            task.await;
        })
    }

    /// 대기 중인 작업 무효화
    pub fn cancel(&self) {
        self.sequence.issue();
    }
}

// endregion: --- Debouncer

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn sequence_tracks_latest_ticket() {
        let seq = RequestSequence::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));
        assert_eq!(seq.latest(), second);
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_call_in_quiet_period_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let ran = Arc::new(Mutex::new(Vec::new()));

        for value in ["l", "la", "lam", "lamp"] {
            let ran = Arc::clone(&ran);
            debouncer.call(async move {
                ran.lock().unwrap().push(value);
            });
            sleep(Duration::from_millis(100)).await;
        }

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["lamp"]);
    }

    #[tokio::test(start_paused = true)]
    async fn calls_separated_by_quiet_period_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let ran = Arc::new(Mutex::new(Vec::new()));

        for value in [1, 2] {
            let ran = Arc::clone(&ran);
            debouncer.call(async move {
                ran.lock().unwrap().push(value);
            });
            sleep(Duration::from_millis(600)).await;
        }

        assert_eq!(*ran.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let ran = Arc::new(Mutex::new(Vec::<u8>::new()));

        let handle = {
            let ran = Arc::clone(&ran);
            debouncer.call(async move {
                ran.lock().unwrap().push(1);
            })
        };
        debouncer.cancel();
        handle.await.unwrap();
        assert!(ran.lock().unwrap().is_empty());
    }
}
