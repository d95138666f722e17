//! The built-in patch: guards `fetchPosts` in the community context against
//! out-of-order responses.
//!
//! Used whenever no configuration file is present.

use crate::config::{PatchConfig, DEFAULT_TARGET};
use crate::patch::{MatchPolicy, OnFailure};

/// `fetchPosts` as it exists before the fix.
pub const FETCH_POSTS_BEFORE: &str = r#"  // Memoized fetch logic
  const fetchPosts = useCallback(async (type, id = null, reset = false) => {
      const state = pageState.current;
      
      if (!reset && (state.loading || !state.hasMore)) return;
      
      state.loading = true;
      setIsFetchingPosts(true); 
      
      if (reset) {
          state.skip = 0;
          state.hasMore = true;
          state.type = type;
          state.id = id;
          setPosts([]); 
      }
      
      try {
          const limit = 10;
          let res;
          
          if (type === 'feed') {
              res = await postApi.getFeed({ skip: state.skip, limit });
          } else if (type === 'explore') {
              res = await postApi.getExploreFeed({ skip: state.skip, limit });
          } else if (type === 'community') {
              res = await postApi.list(id, { skip: state.skip, limit });
          }
          
          // Helper to safely format user logic if missing
          const processed = (res || []).map(p => ({
                ...p,
                author: "User", 
                initials: "U",
                time: new Date(p.created_at).toLocaleDateString(),
                tag: "General",
                likes: 0,
                comments: [], 
                commentsCount: p.comments_count || 0
          }));
          
          setPosts(prev => reset ? processed : [...prev, ...processed]);
          
          state.skip += limit;
          state.hasMore = (res || []).length === limit;
          
      } catch (e) {
          console.error("Fetch posts failed", e);
      } finally {
          state.loading = false;
          setIsFetchingPosts(false);
      }
  }, []);"#;

/// `fetchPosts` with a per-request fetch id. Responses, errors and loading
/// resets from superseded requests are dropped, and `skip` is set rather
/// than incremented after a reset.
pub const FETCH_POSTS_AFTER: &str = r#"  // Memoized fetch logic
  const postsFetchIdRef = useRef(0);

  const fetchPosts = useCallback(async (type, id = null, reset = false) => {
      const state = pageState.current;
      
      // Prevent concurrent loads unless resetting (which force-restarts)
      if (!reset && (state.loading || !state.hasMore)) return;
      
      const currentId = ++postsFetchIdRef.current;
      
      state.loading = true;
      setIsFetchingPosts(true); 
      
      if (reset) {
          state.skip = 0;
          state.hasMore = true;
          state.type = type;
          state.id = id;
          // Optimistically clear posts? Maybe better to wait for data to prevent flash
          // setPosts([]); 
      }
      
      try {
          const limit = 10;
          let res;
          
          if (type === 'feed') {
              res = await postApi.getFeed({ skip: state.skip, limit });
          } else if (type === 'explore') {
              res = await postApi.getExploreFeed({ skip: state.skip, limit });
          } else if (type === 'community') {
              res = await postApi.list(id, { skip: state.skip, limit });
          }

          // Race condition check: if a new request started, ignore this one
          if (currentId !== postsFetchIdRef.current) return;
          
          // Helper to safely format user logic if missing
          const processed = (res || []).map(p => ({
                ...p,
                author: "User", 
                initials: "U",
                time: new Date(p.created_at).toLocaleDateString(),
                tag: "General",
                likes: 0,
                comments: [], 
                commentsCount: p.comments_count || 0
          }));
          
          setPosts(prev => reset ? processed : [...prev, ...processed]);
          
          // Correctly set skip based on CURRENT fetch, not purely incremental
          if (reset) {
              state.skip = limit;
          } else {
              state.skip += limit;
          }
          
          state.hasMore = (res || []).length === limit;
          
      } catch (e) {
          if (currentId === postsFetchIdRef.current) {
               console.error("Fetch posts failed", e);
          }
      } finally {
          if (currentId === postsFetchIdRef.current) {
              state.loading = false;
              setIsFetchingPosts(false);
          }
      }
  }, []);"#;

pub fn fetch_posts_race_guard() -> PatchConfig {
    PatchConfig {
        target: DEFAULT_TARGET.to_string(),
        old_text: Some(FETCH_POSTS_BEFORE.to_string()),
        new_text: Some(FETCH_POSTS_AFTER.to_string()),
        old_file: None,
        new_file: None,
        match_policy: MatchPolicy::Unique,
        on_failure: OnFailure::Warn,
    }
}
